//! WebAssembly bindings for the WebAPI Manager rule state
//!
//! The options page creates one `RuleStoreHandle` per session, fills it from
//! extension storage and writes back whenever `revision()` moves, which only
//! happens when the rules or the logging flag change. Rule sets
//! and persisted snapshots cross the boundary as JSON text; lists cross as
//! arrays of strings.

use wasm_bindgen::prelude::*;
use wam_core::{
    report::{parse_tab_id_query, ReportMessage},
    rule_sets_equivalent, PersistedState, RuleSet, RuleStore, StandardList,
};
use wam_transfer::{export_string, import_text};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

#[wasm_bindgen]
pub struct RuleStoreHandle {
    store: RuleStore,
}

#[wasm_bindgen]
impl RuleStoreHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(initial_domain: &str) -> RuleStoreHandle {
        RuleStoreHandle {
            store: RuleStore::new(initial_domain),
        }
    }

    pub fn load_persisted(&mut self, snapshot_json: &str) -> Result<(), JsValue> {
        let snapshot = PersistedState::from_json(snapshot_json)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse stored state: {}", e)))?;
        self.store.load_persisted(snapshot);
        log::debug!("Loaded {} domain rules from storage", self.store.domain_names().len());
        Ok(())
    }

    pub fn to_persisted(&self) -> Result<String, JsValue> {
        self.store
            .to_persisted()
            .to_json()
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize state: {}", e)))
    }

    /// Returns false when the new rules match the current ones.
    pub fn replace_rule_set(&mut self, rules_json: &str) -> Result<bool, JsValue> {
        let rules = parse_rule_set(rules_json)?;
        Ok(self.store.replace_rule_set(rules))
    }

    pub fn select_domain(&mut self, domain: &str) {
        self.store.select_domain(domain);
    }

    pub fn set_selected_standards(&mut self, standard_ids: JsValue) -> Result<(), JsValue> {
        let standards = standard_list_from_js(&standard_ids)?;
        self.store.set_selected_standards(standards);
        Ok(())
    }

    pub fn delete_domain(&mut self, domain: &str) {
        self.store.delete_domain(domain);
    }

    pub fn add_domain(&mut self, domain: &str) -> Result<(), JsValue> {
        self.store
            .add_domain(domain)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn set_standards_for_domain(&mut self, domain: &str, standard_ids: JsValue) -> Result<(), JsValue> {
        let standards = standard_list_from_js(&standard_ids)?;
        self.store.set_standards_for_domain(domain, standards);
        Ok(())
    }

    pub fn set_should_log(&mut self, should_log: bool) {
        self.store.set_should_log(should_log);
    }

    pub fn selected_domain(&self) -> String {
        self.store.selected_domain().to_string()
    }

    pub fn should_log(&self) -> bool {
        self.store.should_log()
    }

    /// `undefined` when the selected domain has no rule.
    pub fn selected_standard_ids(&self) -> JsValue {
        match self.store.selected_standard_ids() {
            Some(standards) => strings_to_js(standards.iter()).into(),
            None => JsValue::UNDEFINED,
        }
    }

    pub fn domain_names(&self) -> js_sys::Array {
        strings_to_js(self.store.domain_names().iter())
    }

    pub fn domains_with_no_blocked_standards(&self) -> js_sys::Array {
        strings_to_js(self.store.domains_with_no_blocked_standards().iter())
    }

    pub fn domains_with_blocked_standards(&self) -> js_sys::Array {
        strings_to_js(self.store.domains_with_blocked_standards().iter())
    }

    pub fn domain_rules(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.store.domain_rules())
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize rules: {}", e)))
    }

    /// Change counter; persist and broadcast when it moves.
    pub fn revision(&self) -> f64 {
        self.store.revision() as f64
    }

    pub fn import_text(&mut self, text: &str, overwrite: bool) -> JsValue {
        let status = import_text(&mut self.store, text, overwrite);

        let js_result = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&js_result, &"importError".into(), &JsValue::from(status.import_error));
        let _ = js_sys::Reflect::set(&js_result, &"importLog".into(), &JsValue::from_str(&status.import_log));
        js_result.into()
    }

    pub fn export_string(&self, domains: JsValue) -> Result<String, JsValue> {
        let domains = strings_from_js(&domains)?;
        export_string(domains.as_slice(), self.store.domain_rules())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

#[wasm_bindgen]
pub fn rule_sets_equivalent_js(first_json: &str, second_json: &str) -> Result<bool, JsValue> {
    let first = parse_rule_set(first_json)?;
    let second = parse_rule_set(second_json)?;
    Ok(rule_sets_equivalent(&first, &second))
}

#[wasm_bindgen]
pub fn report_request_js(tab_id: u32) -> Result<String, JsValue> {
    ReportMessage::request(tab_id)
        .to_json()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn parse_tab_id_query_js(query: &str) -> Option<u32> {
    parse_tab_id_query(query)
}

/// Decode a report response into `[{url, standards: [{standardId, features}]}]`,
/// frames in id order. Returns `null` for any other message type.
#[wasm_bindgen]
pub fn decode_report_response_js(message_json: &str) -> Result<JsValue, JsValue> {
    let message = ReportMessage::from_json(message_json)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let frames = match message {
        ReportMessage::BlockedFeaturesForTabResponse(frames) => frames,
        ReportMessage::BlockedFeaturesForTab(_) => return Ok(JsValue::NULL),
    };

    let frames_array = js_sys::Array::new();
    for frame in frames.values() {
        let frame_obj = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&frame_obj, &"url".into(), &JsValue::from_str(&frame.url));

        let standards_array = js_sys::Array::new();
        for standard in frame.sorted_standards() {
            let standard_obj = js_sys::Object::new();
            let _ = js_sys::Reflect::set(&standard_obj, &"standardId".into(), &JsValue::from_str(standard.standard_id));
            let _ = js_sys::Reflect::set(&standard_obj, &"features".into(), &strings_to_js(standard.features.iter()));
            standards_array.push(&standard_obj);
        }
        let _ = js_sys::Reflect::set(&frame_obj, &"standards".into(), &standards_array);
        frames_array.push(&frame_obj);
    }

    Ok(frames_array.into())
}

fn parse_rule_set(rules_json: &str) -> Result<RuleSet, JsValue> {
    serde_json::from_str(rules_json)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse rule set: {}", e)))
}

fn strings_from_js(value: &JsValue) -> Result<Vec<String>, JsValue> {
    if !js_sys::Array::is_array(value) {
        return Err(JsValue::from_str("Expected an array of strings"));
    }

    js_sys::Array::from(value)
        .iter()
        .map(|item| {
            item.as_string()
                .ok_or_else(|| JsValue::from_str("Array items must be strings"))
        })
        .collect()
}

fn standard_list_from_js(value: &JsValue) -> Result<StandardList, JsValue> {
    strings_from_js(value).map(StandardList::from)
}

fn strings_to_js<I, S>(values: I) -> js_sys::Array
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let array = js_sys::Array::new();
    for value in values {
        array.push(&JsValue::from_str(value.as_ref()));
    }
    array
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn handle_round_trips_persisted_state() {
        let mut handle = RuleStoreHandle::new("(default)");
        handle
            .load_persisted(r#"{"domainRules":{"(default)":["Console API"]},"shouldLog":true}"#)
            .expect("state should load");

        assert!(handle.should_log());
        assert_eq!(handle.domain_names().length(), 1);

        let stored = handle.to_persisted().expect("state should serialize");
        assert!(stored.contains("Console API"));
    }

    #[wasm_bindgen_test]
    fn handle_reports_import_errors() {
        let mut handle = RuleStoreHandle::new("(default)");
        let status = handle.import_text("not json", false);
        let flag = js_sys::Reflect::get(&status, &"importError".into()).expect("flag should be set");
        assert_eq!(flag.as_bool(), Some(true));
    }

    #[wasm_bindgen_test]
    fn replace_rule_set_reports_noop() {
        let mut handle = RuleStoreHandle::new("a.com");
        assert!(handle.replace_rule_set(r#"{"a.com":["X","Y"]}"#).expect("rules should parse"));
        assert!(!handle.replace_rule_set(r#"{"a.com":["Y","X"]}"#).expect("rules should parse"));
    }
}
