pub mod jwt;
pub mod permission_context;
pub mod pwd;
pub mod time;
pub mod upload;
pub mod validated_form;
pub mod validator;
