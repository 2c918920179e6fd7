pub mod pending;
