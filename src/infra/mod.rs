pub mod ecobazaar;
pub mod settings;
pub mod svg;
