pub mod open_meteo;
pub mod refresher;
pub mod view_model;
pub mod weather_codes;
