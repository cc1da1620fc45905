pub mod command_dto;
pub mod server_descriptor_dto;
pub mod server_info_dto;
pub mod settings_dto;
