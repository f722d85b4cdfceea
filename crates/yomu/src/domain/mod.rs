pub mod entities;
pub mod fallback;
pub mod repositories;
pub mod services;
