use crate::browser::config::{ConnectionOptions, LaunchOptions};
use crate::dom::DomTree;
use crate::error::{InspectorError, Result};
use crate::links::collect_links;
use crate::locator::{LocatedElement, locate_picked};
use headless_chrome::{Browser, Tab};
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// A Chrome/Chromium instance used to snapshot pages and locate elements
pub struct BrowserSession {
    browser: Browser,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // headless_chrome closes idle browsers after 30s by default
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.sandbox = options.sandbox;

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }
        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        let browser = Browser::new(launch_opts).map_err(|e| InspectorError::LaunchFailed(e.to_string()))?;
        browser
            .new_tab()
            .map_err(|e| InspectorError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        log::debug!("browser launched (headless: {})", options.headless);
        Ok(Self { browser })
    }

    /// Connect to an existing browser instance via its DevTools WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url, Duration::from_millis(options.timeout))
            .map_err(|e| InspectorError::ConnectionFailed(e.to_string()))?;

        Ok(Self { browser })
    }

    /// All open tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| InspectorError::ConnectionFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// The visible tab, falling back to the most recently opened one
    pub fn tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.get_tabs()?;

        for tab in &tabs {
            match tab.evaluate("document.visibilityState === 'visible'", false) {
                Ok(remote_object) => {
                    if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                        return Ok(tab.clone());
                    }
                }
                Err(e) => log::debug!("Failed to check tab visibility: {}", e),
            }
        }

        tabs.last()
            .cloned()
            .ok_or_else(|| InspectorError::ConnectionFailed("No open tab".to_string()))
    }

    /// Navigate the active tab and wait for the load to finish
    pub fn navigate(&self, url: &str) -> Result<()> {
        let tab = self.tab()?;
        tab.navigate_to(url)
            .map_err(|e| InspectorError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        self.wait_for_navigation()
    }

    /// Block until the active tab finishes loading
    pub fn wait_for_navigation(&self) -> Result<()> {
        self.tab()?
            .wait_until_navigated()
            .map_err(|e| InspectorError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// Snapshot the active tab's DOM, marking elements matching `pick`
    pub fn snapshot_dom(&self, pick: Option<&str>) -> Result<DomTree> {
        DomTree::from_tab(&self.tab()?, pick)
    }

    /// Derive locators for every element matching `selector` on the active tab
    pub fn locate(&self, selector: &str) -> Result<Vec<LocatedElement>> {
        let tree = self.snapshot_dom(Some(selector))?;
        if tree.picked().is_empty() {
            return Err(InspectorError::ElementNotFound(format!(
                "No element matches '{}'",
                selector
            )));
        }
        Ok(locate_picked(&tree))
    }

    /// Absolute `href`s of the elements matching `selector`, resolved
    /// against the page's base URI (`<base href>`, else the page URL)
    pub fn links(&self, selector: &str) -> Result<Vec<String>> {
        let tab = self.tab()?;
        let tree = DomTree::from_tab(&tab, Some(selector))?;

        let base = match tab.evaluate("document.baseURI", false) {
            Ok(remote_object) => remote_object.value.and_then(|v| v.as_str().map(str::to_string)),
            Err(e) => {
                log::debug!("Failed to read document.baseURI: {}", e);
                None
            }
        };
        collect_links(&tree, &base.unwrap_or_else(|| tab.get_url()))
    }

    /// Close every tab; the browser process exits when the session is dropped
    pub fn close(&self) -> Result<()> {
        for tab in self.get_tabs()? {
            let _ = tab.close(false);
        }
        Ok(())
    }
}
