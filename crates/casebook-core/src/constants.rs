/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";

/// Fixed document slot names on a case. Any other slot name must be the id of
/// a file-kind custom field belonging to the same case.
pub const SLOT_AADHAAR_DOC: &str = "aadhaarDoc";
pub const SLOT_PAN_DOC: &str = "panDoc";
pub const SLOT_ACCOUNT_STATEMENT: &str = "accountStatement";
pub const SLOT_SUPPLEMENTARY_DOC: &str = "supplementaryDoc";

pub const FIXED_DOCUMENT_SLOTS: [&str; 4] = [
    SLOT_AADHAAR_DOC,
    SLOT_PAN_DOC,
    SLOT_ACCOUNT_STATEMENT,
    SLOT_SUPPLEMENTARY_DOC,
];

/// Sentinel phone value for referrals recorded without a phone number.
/// Uniqueness of (name, phone) is only enforced for real phone values.
pub const REFERRAL_PHONE_UNKNOWN: &str = "unknown";

/// The fixed bank enumeration. Banks outside this list go into the case's
/// free-text overflow list instead.
pub const KNOWN_BANKS: [&str; 12] = [
    "State Bank of India",
    "HDFC Bank",
    "ICICI Bank",
    "Axis Bank",
    "Punjab National Bank",
    "Kotak Mahindra Bank",
    "Bank of Baroda",
    "Canara Bank",
    "Union Bank of India",
    "IDFC First Bank",
    "IndusInd Bank",
    "Yes Bank",
];

/// CIBIL score bounds (inclusive).
pub const CIBIL_MIN: i32 = 300;
pub const CIBIL_MAX: i32 = 900;
