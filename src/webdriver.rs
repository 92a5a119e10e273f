use reqwest::blocking::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use log::{debug, info, warn};
use url::Url;
use crate::delay_manager;
use crate::portal::{Element, PortalError, PortalSession, SessionLauncher, Selector};

// W3C key under which element references are returned.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Opens Chrome sessions on a running WebDriver endpoint (e.g. chromedriver).
pub struct WebDriverLauncher {
    client: Client,
    endpoint: Url,
    browser_args: Vec<String>,
}

impl WebDriverLauncher {
    pub fn new(mut endpoint: Url, browser_args: Vec<String>) -> Result<Self, PortalError> {
        // keep the endpoint's own path when joining command paths onto it
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(WebDriverLauncher { client, endpoint, browser_args })
    }

    fn capabilities(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": self.browser_args }
                }
            }
        })
    }

    fn endpoint_url(&self, path: &str) -> Result<Url, PortalError> {
        self.endpoint
            .join(path)
            .map_err(|e| PortalError::Protocol(format!("bad endpoint path '{}': {}", path, e)))
    }
}

impl SessionLauncher for WebDriverLauncher {
    fn launch(&self) -> Result<Box<dyn PortalSession>, PortalError> {
        let value = send(self.client.post(self.endpoint_url("session")?).json(&self.capabilities()))?;
        let id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| PortalError::Protocol("new session response carried no sessionId".into()))?
            .to_string();

        let session_url = self.endpoint_url(&format!("session/{}", id))?;
        info!("Opened browser session {}", id);

        Ok(Box::new(WebDriverSession {
            client: self.client.clone(),
            session_url: session_url.to_string(),
            id,
            closed: false,
        }))
    }
}

/// One live browser session. Deleted on `close`, or on drop if still open.
pub struct WebDriverSession {
    client: Client,
    session_url: String,
    id: String,
    closed: bool,
}

impl WebDriverSession {
    fn command(&self, path: &str) -> Result<String, PortalError> {
        if self.closed {
            return Err(PortalError::Closed);
        }
        Ok(format!("{}/{}", self.session_url, path))
    }

    fn post(&self, path: &str, body: Value) -> Result<Value, PortalError> {
        let url = self.command(path)?;
        send(self.client.post(url).json(&body))
    }

    fn get(&self, path: &str) -> Result<Value, PortalError> {
        let url = self.command(path)?;
        send(self.client.get(url))
    }

    fn find(&self, selector: &Selector) -> Result<Element, PortalError> {
        let value = self.post("element", json!({ "using": selector.strategy(), "value": selector.value() }))?;
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(|id| Element(id.to_string()))
            .ok_or_else(|| PortalError::Protocol(format!("find element returned no reference for {}", selector)))
    }

    fn flag(&self, element: &Element, property: &str) -> Result<bool, PortalError> {
        let value = self.get(&format!("element/{}/{}", element.0, property))?;
        value
            .as_bool()
            .ok_or_else(|| PortalError::Protocol(format!("element {} was not a boolean", property)))
    }

    fn is_clickable(&self, element: &Element) -> Result<bool, PortalError> {
        Ok(self.flag(element, "displayed")? && self.flag(element, "enabled")?)
    }

    /// Polls for `selector` until `ready` accepts the element or the deadline passes.
    fn wait_for<F>(&self, selector: &Selector, timeout: Duration, ready: F) -> Result<Element, PortalError>
    where
        F: Fn(&Self, &Element) -> Result<bool, PortalError>,
    {
        let deadline = Instant::now() + timeout;
        loop {
            match self.find(selector).and_then(|el| ready(self, &el).map(|ok| (el, ok))) {
                Ok((el, true)) => return Ok(el),
                Ok((_, false)) | Err(PortalError::NoSuchElement(_)) => {}
                Err(PortalError::WebDriver { ref error, .. }) if error == "stale element reference" => {}
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            if now >= deadline {
                debug!("Gave up waiting for {} after {:?}", selector, timeout);
                return Err(PortalError::Timeout { selector: selector.to_string(), timeout });
            }
            delay_manager::poll_pause(POLL_INTERVAL.min(deadline - now));
        }
    }

    fn delete(&mut self) -> Result<(), PortalError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        send(self.client.delete(&self.session_url))?;
        info!("Closed browser session {}", self.id);
        Ok(())
    }
}

impl PortalSession for WebDriverSession {
    fn navigate(&mut self, url: &str) -> Result<(), PortalError> {
        debug!("Navigating to {}", url);
        self.post("url", json!({ "url": url })).map(|_| ())
    }

    fn locate(&mut self, selector: &Selector, timeout: Duration) -> Result<Element, PortalError> {
        self.wait_for(selector, timeout, |_, _| Ok(true))
    }

    fn locate_clickable(&mut self, selector: &Selector, timeout: Duration) -> Result<Element, PortalError> {
        self.wait_for(selector, timeout, |session, el| session.is_clickable(el))
    }

    fn click(&mut self, element: &Element) -> Result<(), PortalError> {
        self.post(&format!("element/{}/click", element.0), json!({})).map(|_| ())
    }

    fn clear(&mut self, element: &Element) -> Result<(), PortalError> {
        self.post(&format!("element/{}/clear", element.0), json!({})).map(|_| ())
    }

    fn type_text(&mut self, element: &Element, text: &str) -> Result<(), PortalError> {
        self.post(&format!("element/{}/value", element.0), json!({ "text": text })).map(|_| ())
    }

    fn read_text(&mut self, element: &Element) -> Result<String, PortalError> {
        let value = self.get(&format!("element/{}/text", element.0))?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PortalError::Protocol("element text was not a string".into()))
    }

    fn close(&mut self) -> Result<(), PortalError> {
        self.delete()
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        if let Err(e) = self.delete() {
            warn!("Failed to delete browser session {}: {}", self.id, e);
        }
    }
}

/// Sends a command and unwraps the protocol's `{"value": ...}` envelope.
fn send(request: RequestBuilder) -> Result<Value, PortalError> {
    let resp = request.send()?;
    let status = resp.status();
    let mut body: Value = resp.json()?;
    let value = body.get_mut("value").map(Value::take).unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }

    let error = value.get("error").and_then(Value::as_str).unwrap_or("unknown error").to_string();
    let message = value.get("message").and_then(Value::as_str).unwrap_or_default().to_string();
    if error == "no such element" {
        return Err(PortalError::NoSuchElement(message));
    }
    Err(PortalError::WebDriver { error, message })
}
