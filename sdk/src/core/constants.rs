use solana_sdk::pubkey::Pubkey;

/// Decimals used when the draft leaves them unset
pub const DEFAULT_DECIMALS: u8 = 9;

/// SOL itself has 9 decimals
pub const SOL_DECIMALS: u8 = 9;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Metaplex limits on the metadata account fields
pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;

/// Toasts disappear on their own after this many seconds
pub const NOTIFICATION_TTL_SECS: u64 = 8;

pub const EXPLORER_BASE_URL: &str = "https://explorer.solana.com";

pub const PINATA_API_URL: &str = "https://api.pinata.cloud";
pub const PINATA_GATEWAY_URL: &str = "https://gateway.pinata.cloud";
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Image formats accepted by the media uploader
pub const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
];

pub const FORMS_ENDPOINT: &str = "https://formspree.io/f";

/// Seeds for derived addresses
pub mod seeds {
    pub const METADATA: &[u8] = b"metadata";
}

/// SPL token program
pub fn token_program_id() -> Pubkey {
    spl_token::id()
}

/// Associated token account program
pub fn associated_token_program_id() -> Pubkey {
    spl_associated_token_account::id()
}

/// Metaplex token metadata program
pub fn metadata_program_id() -> Pubkey {
    mpl_token_metadata::ID
}
