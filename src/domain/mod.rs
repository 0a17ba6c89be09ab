pub mod ai;
pub mod entity;
pub mod geom;
pub mod map;
pub mod physics;
pub mod spawn;
pub mod tile;
