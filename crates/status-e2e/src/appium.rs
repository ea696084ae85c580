//! Appium-backed devices over the W3C WebDriver HTTP protocol.
//!
//! Only the handful of endpoints [`AutomationDriver`] needs are wrapped:
//! element lookup and state, taps and typing, pointer actions for long
//! presses, and `mobile:` execute commands for keys, deep links and app
//! lifecycle.

use crate::config::E2eConfig;
use crate::driver::{AutomationDriver, By, ElementRef};
use crate::result::{E2eError, E2eResult};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// W3C key under which element ids are returned
const ELEMENT_KEY: &str = "element-6066-11e4-a4e3-a6a1b7bd3f6f";

/// Per-request HTTP timeout; Appium can be slow to start a session
const HTTP_TIMEOUT_SECS: u64 = 300;

/// W3C error codes that mean the element is gone
const MISSING_ELEMENT_ERRORS: [&str; 2] = ["no such element", "stale element reference"];

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: String,
    #[serde(default)]
    message: String,
}

/// One Appium session
#[derive(Debug)]
pub struct AppiumDriver {
    base_url: String,
    session_id: String,
    client: reqwest::blocking::Client,
}

impl AppiumDriver {
    /// Start a session for device `index` of the configuration
    pub fn connect(config: &E2eConfig, index: usize) -> E2eResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| E2eError::driver(format!("cannot build HTTP client: {e}")))?;
        let base_url = config.appium_url.trim_end_matches('/').to_string();
        let body = json!({
            "capabilities": { "alwaysMatch": config.capabilities_for(index) }
        });
        tracing::info!(device = index + 1, url = %base_url, "starting Appium session");
        let value = send(client.post(format!("{base_url}/session")).json(&body))?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| E2eError::driver("new session response has no sessionId"))?
            .to_string();
        tracing::info!(device = index + 1, session = %session_id, "Appium session started");
        Ok(Self {
            base_url,
            session_id,
            client,
        })
    }

    /// Remote session id
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/session/{}{path}", self.base_url, self.session_id)
    }

    fn get(&self, path: &str) -> E2eResult<Value> {
        send(self.client.get(self.url(path)))
    }

    fn post(&self, path: &str, body: &Value) -> E2eResult<Value> {
        send(self.client.post(self.url(path)).json(body))
    }

    fn element_path(element: &ElementRef, suffix: &str) -> String {
        format!("/element/{}{suffix}", element.id())
    }

    fn execute(&self, script: &str, args: Value) -> E2eResult<Value> {
        self.post(
            "/execute/sync",
            &json!({ "script": script, "args": [args] }),
        )
    }
}

fn send(request: reqwest::blocking::RequestBuilder) -> E2eResult<Value> {
    let response = request
        .send()
        .map_err(|e| E2eError::driver(format!("HTTP error: {e}")))?;
    let status = response.status();
    let body: WireResponse = response
        .json()
        .map_err(|e| E2eError::driver(format!("unreadable response ({status}): {e}")))?;
    if status.is_success() {
        Ok(body.value)
    } else {
        Err(wire_error(status.as_u16(), body.value))
    }
}

/// Map a W3C error payload to an [`E2eError`]
fn wire_error(status: u16, value: Value) -> E2eError {
    match serde_json::from_value::<WireError>(value) {
        Ok(err) if MISSING_ELEMENT_ERRORS.contains(&err.error.as_str()) => {
            E2eError::ElementNotFound {
                locator: err.message,
                timeout_ms: 0,
            }
        }
        Ok(err) => E2eError::driver(format!("{} ({status}): {}", err.error, err.message)),
        Err(_) => E2eError::driver(format!("request failed with status {status}")),
    }
}

/// Element ids from a `/elements` response
fn element_refs(value: &Value) -> Vec<ElementRef> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get(ELEMENT_KEY).and_then(Value::as_str))
                .map(ElementRef::new)
                .collect()
        })
        .unwrap_or_default()
}

/// Pointer actions holding a touch on `element` for `duration`
fn long_press_actions(element: &ElementRef, duration: Duration) -> Value {
    let hold_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    json!({
        "actions": [{
            "type": "pointer",
            "id": "finger1",
            "parameters": { "pointerType": "touch" },
            "actions": [
                { "type": "pointerMove", "duration": 0, "x": 0, "y": 0,
                  "origin": { ELEMENT_KEY: element.id() } },
                { "type": "pointerDown", "button": 0 },
                { "type": "pause", "duration": hold_ms },
                { "type": "pointerUp", "button": 0 }
            ]
        }]
    })
}

impl AutomationDriver for AppiumDriver {
    fn find_elements(&self, by: &By) -> E2eResult<Vec<ElementRef>> {
        let value = self.post(
            "/elements",
            &json!({ "using": by.strategy(), "value": by.value() }),
        )?;
        Ok(element_refs(&value))
    }

    fn is_displayed(&self, element: &ElementRef) -> E2eResult<bool> {
        let value = self.get(&Self::element_path(element, "/displayed"))?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn click(&self, element: &ElementRef) -> E2eResult<()> {
        self.post(&Self::element_path(element, "/click"), &json!({}))
            .map(drop)
    }

    fn send_keys(&self, element: &ElementRef, text: &str) -> E2eResult<()> {
        self.post(&Self::element_path(element, "/value"), &json!({ "text": text }))
            .map(drop)
    }

    fn clear(&self, element: &ElementRef) -> E2eResult<()> {
        self.post(&Self::element_path(element, "/clear"), &json!({}))
            .map(drop)
    }

    fn text(&self, element: &ElementRef) -> E2eResult<String> {
        let value = self.get(&Self::element_path(element, "/text"))?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    fn attribute(&self, element: &ElementRef, name: &str) -> E2eResult<Option<String>> {
        let value = self.get(&Self::element_path(element, &format!("/attribute/{name}")))?;
        Ok(match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    fn long_press(&self, element: &ElementRef, duration: Duration) -> E2eResult<()> {
        self.post("/actions", &long_press_actions(element, duration))
            .map(drop)
    }

    fn back(&self) -> E2eResult<()> {
        self.post("/back", &json!({})).map(drop)
    }

    fn press_keycode(&self, keycode: u32) -> E2eResult<()> {
        self.execute("mobile: pressKey", json!({ "keycode": keycode }))
            .map(drop)
    }

    fn open_deep_link(&self, url: &str, package: &str) -> E2eResult<()> {
        self.execute("mobile: deepLink", json!({ "url": url, "package": package }))
            .map(drop)
    }

    fn current_package(&self) -> E2eResult<String> {
        let value = self.execute("mobile: getCurrentPackage", json!({}))?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| E2eError::driver("current package is not a string"))
    }

    fn terminate_app(&self, package: &str) -> E2eResult<()> {
        self.execute("mobile: terminateApp", json!({ "appId": package }))
            .map(drop)
    }

    fn activate_app(&self, package: &str) -> E2eResult<()> {
        self.execute("mobile: activateApp", json!({ "appId": package }))
            .map(drop)
    }

    fn quit(&self) -> E2eResult<()> {
        send(self.client.delete(self.url(""))).map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod wire_tests {
        use super::*;

        #[test]
        fn test_element_refs() {
            let value = json!([
                { ELEMENT_KEY: "00000000-0001" },
                { ELEMENT_KEY: "00000000-0002" },
                { "unexpected": "x" }
            ]);
            assert_eq!(
                element_refs(&value),
                vec![ElementRef::new("00000000-0001"), ElementRef::new("00000000-0002")]
            );
            assert!(element_refs(&json!(null)).is_empty());
        }

        #[test]
        fn test_missing_element_maps_to_not_found() {
            let err = wire_error(
                404,
                json!({ "error": "no such element", "message": "An element could not be located" }),
            );
            assert!(err.is_not_found());
            let err = wire_error(404, json!({ "error": "stale element reference", "message": "" }));
            assert!(err.is_not_found());
        }

        #[test]
        fn test_other_errors_are_driver_errors() {
            let err = wire_error(
                500,
                json!({ "error": "unknown error", "message": "instrumentation crashed" }),
            );
            assert!(matches!(err, E2eError::Driver { .. }));
            assert!(err.to_string().contains("instrumentation crashed"));
            assert!(matches!(wire_error(502, json!("bad gateway")), E2eError::Driver { .. }));
        }

        #[test]
        fn test_long_press_actions() {
            let body = long_press_actions(&ElementRef::new("abc"), Duration::from_millis(1500));
            let steps = &body["actions"][0]["actions"];
            assert_eq!(steps[0]["origin"][ELEMENT_KEY], "abc");
            assert_eq!(steps[2]["duration"], 1500);
            assert_eq!(steps[3]["type"], "pointerUp");
        }
    }

    mod connect_tests {
        use super::*;

        #[test]
        fn test_connect_to_unreachable_server_is_driver_error() {
            let config = E2eConfig::default().with_appium_url("http://127.0.0.1:9");
            let err = AppiumDriver::connect(&config, 0).unwrap_err();
            assert!(matches!(err, E2eError::Driver { .. }));
        }
    }
}
