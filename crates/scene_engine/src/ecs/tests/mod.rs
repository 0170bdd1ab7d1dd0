//! Cross-module scenarios for the entity layer

mod persistence_roundtrip;
