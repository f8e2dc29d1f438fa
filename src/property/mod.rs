mod property;

pub use property::Property;
