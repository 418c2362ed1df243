pub use eclio_file::*;
pub use {
    eclio_codec as codec, eclio_dtype as dtype, eclio_error as error, eclio_file as file,
    eclio_metrics as metrics,
};
