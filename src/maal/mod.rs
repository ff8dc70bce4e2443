pub mod business;
pub mod cash;
pub mod investments;
pub mod precious_metals;
