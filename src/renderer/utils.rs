pub mod apiversion;
pub mod cstringstuff;
pub mod debug;
pub mod extension;
pub mod layer;
pub mod properties;
