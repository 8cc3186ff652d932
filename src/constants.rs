pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 60 * 60 * 24 * 14;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_CLIENT_URL: &str = "http://localhost:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_AGENT_USER_ID: &str = "0";

pub const MAX_BODY_BYTES: u64 = 1024 * 1024;

pub const UNTITLED_RECIPE: &str = "Untitled recipe";
pub const UNKNOWN_AUTHOR: &str = "Unknown";

pub const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
pub const GOOGLE_ISSUERS: &[&str] = &["accounts.google.com", "https://accounts.google.com"];

pub const CUISINE_CATEGORIES: &[(&str, &str)] = &[
    ("한식", "Korean"),
    ("중식", "Chinese"),
    ("일식", "Japanese"),
    ("양식", "Western"),
    ("이탈리안", "Italian"),
    ("태국식", "Thai"),
    ("베트남식", "Vietnamese"),
    ("인도식", "Indian"),
    ("멕시코식", "Mexican"),
    ("퓨전", "Fusion"),
    ("베이킹", "Baking"),
    ("디저트", "Dessert"),
    ("기타", "Other"),
];
