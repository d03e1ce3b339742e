pub mod atom;
pub mod cell;
pub mod fragment;
pub mod net;
pub mod record;
pub mod structure;
pub mod types;
