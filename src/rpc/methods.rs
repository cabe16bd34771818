//! RPC Method Implementations
//!
//! Each method corresponds to a JSON-RPC call that external apps can
//! make. Malformed parameters are rejected here and never reach the
//! ledger; unseen tags come back as default records, not errors.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::constants::COIN;
use crate::loyalty::{
    allowed_subsidy, base_subsidy, level_from_points, level_text, tag12_from_address,
    LoyaltyLedger, MinerTag,
};
use crate::storage::ChainState;

/// JSON-RPC 2.0 Request
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Option<serde_json::Value>,
    pub id: serde_json::Value,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<JsonRpcError>,
    pub id: serde_json::Value,
}

/// JSON-RPC Error
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

/// Invalid-parameter error code
pub const RPC_INVALID_PARAMS: i32 = -32602;
/// Unknown-method error code
pub const RPC_METHOD_NOT_FOUND: i32 = -32601;

impl JsonRpcResponse {
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: serde_json::Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError { code, message }),
            id,
        }
    }
}

/// RPC Handler State
pub struct RpcState {
    pub chain_state: Arc<Mutex<ChainState>>,
    pub ledger: Arc<LoyaltyLedger>,
}

/// Process a JSON-RPC request and return a response
pub fn handle_request(state: &RpcState, request: JsonRpcRequest) -> JsonRpcResponse {
    match request.method.as_str() {
        "getblockcount" => get_block_count(state, request.id),
        "getallowedtag" => get_allowed_tag(state, request.id, request.params),
        "getaddressstatus" => get_address_status(state, request.id, request.params),
        "getloyaltyinfo" => get_loyalty_info(state, request.id),
        _ => JsonRpcResponse::error(
            request.id,
            RPC_METHOD_NOT_FOUND,
            format!("Method not found: {}", request.method),
        ),
    }
}

/// Render base units as a whole-coin decimal string (8 places)
fn format_coin(value: u64) -> String {
    format!("{}.{:08}", value / COIN, value % COIN)
}

/// Accept a height as either a JSON number or a decimal string
///
/// Some CLI variants pass every positional parameter as a string.
fn parse_height_flexible(v: &serde_json::Value) -> Result<i64, String> {
    if let Some(n) = v.as_i64() {
        if n < 0 {
            return Err("height out of range".into());
        }
        return Ok(n);
    }
    if let Some(s) = v.as_str() {
        if s.is_empty() {
            return Err("height must be a number".into());
        }
        let parsed: i64 = s.parse().map_err(|_| "height must be a number".to_string())?;
        if parsed < 0 {
            return Err("height out of range".into());
        }
        return Ok(parsed);
    }
    Err("height must be a number".into())
}

fn params_array(params: Option<serde_json::Value>) -> Vec<serde_json::Value> {
    match params {
        Some(serde_json::Value::Array(arr)) => arr,
        Some(other) => vec![other],
        None => Vec::new(),
    }
}

fn tip_height(state: &RpcState) -> i64 {
    state.chain_state.lock().unwrap().tip_height()
}

/// Returns the current block height
fn get_block_count(state: &RpcState, id: serde_json::Value) -> JsonRpcResponse {
    JsonRpcResponse::success(id, serde_json::json!(tip_height(state)))
}

/// Allowed PoL subsidy for an embedded miner tag
/// Params: [miner_tag_hex, height?]
fn get_allowed_tag(
    state: &RpcState,
    id: serde_json::Value,
    params: Option<serde_json::Value>,
) -> JsonRpcResponse {
    let params = params_array(params);
    let Some(tag_hex) = params.first().and_then(|v| v.as_str()) else {
        return JsonRpcResponse::error(
            id,
            RPC_INVALID_PARAMS,
            "Invalid params: expected miner_tag_hex".into(),
        );
    };

    let tag = match MinerTag::from_hex(tag_hex) {
        Ok(tag) => tag,
        Err(e) => return JsonRpcResponse::error(id, RPC_INVALID_PARAMS, e.to_string()),
    };

    let tip = tip_height(state);
    let height = match params.get(1).filter(|v| !v.is_null()) {
        Some(v) => match parse_height_flexible(v) {
            Ok(h) => h,
            Err(e) => return JsonRpcResponse::error(id, RPC_INVALID_PARAMS, e),
        },
        // The next block to be mined is the natural evaluation point
        None => tip + 1,
    };

    let allowed = allowed_subsidy(&state.ledger, &tag, height);

    JsonRpcResponse::success(
        id,
        serde_json::json!({
            "tip_height": tip,
            "height": height,
            "miner_tag_hex": tag_hex,
            "miner_tag_len": tag.len(),
            "allowed_subsidy": allowed,
            "allowed_subsidy_coin": format_coin(allowed),
        }),
    )
}

/// Full PoL status for a miner payout address
/// Params: [address, height?]
fn get_address_status(
    state: &RpcState,
    id: serde_json::Value,
    params: Option<serde_json::Value>,
) -> JsonRpcResponse {
    let params = params_array(params);
    let Some(address) = params.first().and_then(|v| v.as_str()) else {
        return JsonRpcResponse::error(
            id,
            RPC_INVALID_PARAMS,
            "Invalid params: expected address".into(),
        );
    };

    let tip = tip_height(state);
    let height = match params.get(1).filter(|v| !v.is_null()) {
        Some(v) => match parse_height_flexible(v) {
            Ok(h) => h,
            Err(e) => return JsonRpcResponse::error(id, RPC_INVALID_PARAMS, e),
        },
        None => tip.max(0),
    };

    let tag = tag12_from_address(address);
    let status = state.ledger.get_status(&tag).unwrap_or_default();

    let allowed = allowed_subsidy(&state.ledger, &tag, height);
    let base = base_subsidy(height);
    let bonus = allowed.saturating_sub(base);

    let level = level_from_points(status.seen, status.points);

    JsonRpcResponse::success(
        id,
        serde_json::json!({
            "tip_height": tip,
            "height": height,
            "address": address,
            "miner_tag_hex": tag.hex(),
            "miner_tag_len": tag.len(),
            "miner_tag_u32": tag.as_u32_le(),
            "extranonce1_size": state.ledger.params().extranonce1_size,
            "seen": status.seen,
            "first_seen_height": status.first_seen_height,
            "last_seen_height": status.last_seen_height,
            "blocks_seen": status.blocks_seen,
            "last_seen_time": status.last_seen_time,
            "points": status.points,
            "level": level,
            "level_text": level_text(level),
            "last_seen_month": status.last_seen_month,
            "allowed_subsidy": allowed,
            "allowed_subsidy_coin": format_coin(allowed),
            "base_subsidy": base,
            "base_subsidy_coin": format_coin(base),
            "bonus_subsidy": bonus,
            "bonus_subsidy_coin": format_coin(bonus),
        }),
    )
}

/// PoL configuration and ledger size
fn get_loyalty_info(state: &RpcState, id: serde_json::Value) -> JsonRpcResponse {
    let params = state.ledger.params();
    JsonRpcResponse::success(
        id,
        serde_json::json!({
            "tip_height": tip_height(state),
            "start_height": params.start_height,
            "enforce_height": params.enforce_height,
            "month_blocks": params.month_blocks,
            "extranonce1_size": params.extranonce1_size,
            "tracked_tags": state.ledger.len(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loyalty::PolParams;

    fn make_state() -> RpcState {
        RpcState {
            chain_state: Arc::new(Mutex::new(ChainState::new())),
            ledger: Arc::new(LoyaltyLedger::new(PolParams::new(1, 1, 10, 4))),
        }
    }

    fn request(method: &str, params: serde_json::Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".into(),
            method: method.into(),
            params: Some(params),
            id: serde_json::json!(1),
        }
    }

    #[test]
    fn test_height_flexible_parse() {
        assert_eq!(parse_height_flexible(&serde_json::json!(110)), Ok(110));
        assert_eq!(parse_height_flexible(&serde_json::json!("110")), Ok(110));
        assert!(parse_height_flexible(&serde_json::json!("")).is_err());
        assert!(parse_height_flexible(&serde_json::json!("12x")).is_err());
        assert!(parse_height_flexible(&serde_json::json!(-1)).is_err());
        assert!(parse_height_flexible(&serde_json::json!(true)).is_err());
    }

    #[test]
    fn test_format_coin() {
        assert_eq!(format_coin(0), "0.00000000");
        assert_eq!(format_coin(COIN), "1.00000000");
        assert_eq!(format_coin(2_500_000_000), "25.00000000");
        assert_eq!(format_coin(COIN + 1), "1.00000001");
    }

    #[test]
    fn test_allowed_tag_rejects_bad_hex() {
        let state = make_state();

        let resp = handle_request(&state, request("getallowedtag", serde_json::json!(["abc"])));
        assert_eq!(resp.error.unwrap().code, RPC_INVALID_PARAMS);

        let resp = handle_request(
            &state,
            request("getallowedtag", serde_json::json!(["zzzzzzzz"])),
        );
        assert_eq!(resp.error.unwrap().code, RPC_INVALID_PARAMS);
    }

    #[test]
    fn test_allowed_tag_defaults_to_tip_plus_one() {
        let state = make_state();
        let resp = handle_request(
            &state,
            request("getallowedtag", serde_json::json!(["01020304"])),
        );
        let result = resp.result.unwrap();
        assert_eq!(result["tip_height"], -1);
        assert_eq!(result["height"], 0);
        assert_eq!(result["miner_tag_len"], 4);
    }

    #[test]
    fn test_address_status_unseen_defaults() {
        let state = make_state();
        let resp = handle_request(
            &state,
            request("getaddressstatus", serde_json::json!(["lyra1qneverseen", "100"])),
        );
        let result = resp.result.unwrap();

        assert_eq!(result["seen"], false);
        assert_eq!(result["points"], 0);
        assert_eq!(result["level"], 0);
        assert_eq!(result["level_text"], "No level");
        assert_eq!(result["first_seen_height"], -1);
        assert_eq!(result["last_seen_month"], -1);
        assert_eq!(result["miner_tag_len"], 12);
        assert_eq!(result["allowed_subsidy"], result["base_subsidy"]);
        assert_eq!(result["bonus_subsidy"], 0);
    }

    #[test]
    fn test_address_status_after_observations() {
        let state = make_state();
        let tag = tag12_from_address("lyra1qminer");
        state.ledger.record_observation(&tag, 5, 111);
        state.ledger.record_observation(&tag, 15, 222);

        let resp = handle_request(
            &state,
            // Worker suffix must map to the same identity
            request("getaddressstatus", serde_json::json!(["lyra1qminer.rig7", 100])),
        );
        let result = resp.result.unwrap();

        assert_eq!(result["seen"], true);
        assert_eq!(result["points"], 4);
        assert_eq!(result["level"], 2);
        assert_eq!(result["level_text"], "Level 2");
        assert_eq!(result["blocks_seen"], 2);
        assert_eq!(result["last_seen_time"], 222);
    }

    #[test]
    fn test_unknown_method() {
        let state = make_state();
        let resp = handle_request(&state, request("getwidgets", serde_json::json!([])));
        assert_eq!(resp.error.unwrap().code, RPC_METHOD_NOT_FOUND);
    }

    #[test]
    fn test_loyalty_info() {
        let state = make_state();
        let resp = handle_request(&state, request("getloyaltyinfo", serde_json::json!([])));
        let result = resp.result.unwrap();
        assert_eq!(result["month_blocks"], 10);
        assert_eq!(result["tracked_tags"], 0);
    }
}
