/// Column names and defaults shared across the pipeline stages

// Columns dropped during transformation when present
pub const DROPPED_COLUMNS: &[&str] = &[
    "id",
    "Country",
    "Customer_id",
    "Product_id",
    "user_id",
    "order_s",
    "state_id",
];

// Column coerced to a calendar date during transformation
pub const ORDER_DATE_COLUMN: &str = "Order_Date";

// Cell contents read as a missing value (compared after trimming)
pub const MISSING_VALUE_TOKENS: &[&str] = &[
    "",
    "#N/A",
    "#N/A N/A",
    "#NA",
    "-1.#IND",
    "-1.#QNAN",
    "-NaN",
    "-nan",
    "1.#IND",
    "1.#QNAN",
    "<NA>",
    "N/A",
    "NA",
    "NULL",
    "NaN",
    "None",
    "n/a",
    "nan",
    "null",
];

// Defaults matching the stock connection record and file names
pub const DEFAULT_INPUT_PATH: &str = "superstore.csv";
pub const DEFAULT_ENCODING: &str = "ISO-8859-1";
pub const DEFAULT_DELIMITER: char = ',';
pub const DEFAULT_TABLE_NAME: &str = "YourTableName";
pub const DEFAULT_DB_USER: &str = "YourUser";
pub const DEFAULT_DB_PASSWORD: &str = "YourPassword";
pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_NAME: &str = "YourDB";

// Environment variable that overrides the configured password
pub const DB_PASSWORD_ENV: &str = "ETL_DB_PASSWORD";

/// Whether a raw cell should be read as a missing value
pub fn is_missing_token(raw: &str) -> bool {
    MISSING_VALUE_TOKENS.contains(&raw.trim())
}
