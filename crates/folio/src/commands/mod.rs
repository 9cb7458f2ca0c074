pub mod theme;
pub mod toc;
pub mod verify;
