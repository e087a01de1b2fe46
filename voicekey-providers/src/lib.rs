pub mod parse;
pub mod recognise;
pub mod request;
pub mod runtime;
