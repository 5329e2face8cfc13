pub mod auth_const {
    pub const JWT_ISSUER: &str = "surplus-share";
    pub const BEARER_SCHEME: &str = "Bearer";
}

pub mod report_const {
    pub const REPORT_WINDOW_DAYS: i64 = 30;
    pub const REPORT_PERIOD: &str = "last_30_days";
}

pub mod upload_const {
    pub const IMAGE_DIR: &str = "images";
    pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];
}
