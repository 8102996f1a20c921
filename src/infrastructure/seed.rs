use wasm_bindgen::prelude::*;

use crate::domain::errors::{AppResult, ExternalServiceError};
use crate::domain::repositories::SeedModule;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_name = wasmNewWalletSeed)]
    fn wasm_new_wallet_seed() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = wasmAddressFromSeed)]
    fn wasm_address_from_seed(seed: &str) -> Result<JsValue, JsValue>;
}

/// Key derivation module the wallet page loads next to this one.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageSeedModule;

impl SeedModule for PageSeedModule {
    fn new_seed(&self) -> AppResult<String> {
        let value = wasm_new_wallet_seed().map_err(|e| seed_error("wasmNewWalletSeed", &e))?;
        expect_string("wasmNewWalletSeed", value)
    }

    /// Zero address of the seed.
    fn address_from_seed(&self, seed: &str) -> AppResult<String> {
        let value = wasm_address_from_seed(seed).map_err(|e| seed_error("wasmAddressFromSeed", &e))?;
        expect_string("wasmAddressFromSeed", value)
    }
}

fn seed_error(call: &str, error: &JsValue) -> ExternalServiceError {
    let message = error.as_string().unwrap_or_else(|| format!("{error:?}"));
    ExternalServiceError::SeedModuleError(format!("{call} threw: {message}"))
}

fn expect_string(call: &str, value: JsValue) -> AppResult<String> {
    value.as_string().ok_or_else(|| {
        ExternalServiceError::SeedModuleError(format!("{call} did not return a string")).into()
    })
}
