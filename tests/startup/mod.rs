mod connect_to_database;
mod load_config;
