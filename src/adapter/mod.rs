pub mod nlc;
