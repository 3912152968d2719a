pub mod db;
pub mod image_clients;
pub mod llm_clients;
pub mod response;
