//! Archcare Control - command-line front end for archcare_common

pub mod cli;
pub mod errors;
pub mod output;
pub mod run;
