pub mod starsystem;
