//! Provider driven entirely by a [`ProviderConfig`]: CSS selectors for row
//! parts, class names for classification and a body text color for the theme.

use rowglyph_core::{
    Classification, IconHandle, Provider, ProviderConfig, ProviderError, ProviderResult, Resync,
    Theme, theme_from_text_color,
};
use std::cell::RefCell;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlImageElement, Window};

use super::observer::{self, Observation};
use crate::config::{ICON_ATTR, STYLE_ELEMENT_ID, THEME_PROPERTY};
use crate::error::js_message;
use crate::utils::dom;

pub struct SelectorProvider {
    config: ProviderConfig,
    window: Window,
    document: Document,
    /// One observer per row currently on the page
    observers: RefCell<Vec<(Element, Observation)>>,
}

impl SelectorProvider {
    pub fn new(config: ProviderConfig, window: Window, document: Document) -> Self {
        Self {
            config,
            window,
            document,
            observers: RefCell::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Number of rows with a live observer.
    pub fn observed_rows(&self) -> usize {
        self.observers.borrow().len()
    }

    fn is_observing(&self, row: &Element) -> bool {
        self.observers.borrow().iter().any(|(observed, _)| observed == row)
    }

    /// The host's icon element inside a row.
    fn icon_element(&self, row: &Element) -> Option<Element> {
        dom::find(row, &self.config.selectors.icon)
    }

    fn create_icon(&self, icon: &IconHandle) -> ProviderResult<HtmlImageElement> {
        let img = self
            .document
            .create_element("img")
            .map_err(|e| ProviderError::DomRejected(js_message(&e)))?
            .dyn_into::<HtmlImageElement>()
            .map_err(|_| ProviderError::DomRejected("created element is not an <img>".into()))?;

        img.set_src(&icon.url);
        img.set_alt("");
        img.set_attribute(ICON_ATTR, &icon.name)
            .map_err(|e| ProviderError::DomRejected(js_message(&e)))?;

        let style = img.style();
        let size = self.config.icon_size.as_str();
        for (property, value) in [("display", "inline-flex"), ("height", size), ("width", size)] {
            style
                .set_property(property, value)
                .map_err(|e| ProviderError::DomRejected(js_message(&e)))?;
        }
        Ok(img)
    }
}

impl Provider for SelectorProvider {
    type Root = Document;
    type Row = Element;

    fn domain(&self) -> &str {
        &self.config.domain
    }

    fn locate_rows(&self, root: &Document) -> ProviderResult<Vec<Element>> {
        let list = root
            .query_selector_all(&self.config.selectors.row)
            .map_err(|_| ProviderError::SelectorMiss(self.config.selectors.row.clone()))?;
        Ok(dom::elements(&list))
    }

    fn filename(&self, row: &Element) -> Option<String> {
        dom::find(row, &self.config.selectors.filename)?.text_content()
    }

    fn classify(&self, row: &Element) -> Classification {
        match self.icon_element(row) {
            Some(icon) => {
                let classes = icon.class_list();
                self.config.classes.classify(|class| classes.contains(class))
            }
            None => Classification::default(),
        }
    }

    fn detect_theme(&self) -> Theme {
        let color = dom::body_style(&self.window, &self.document, THEME_PROPERTY);
        theme_from_text_color(
            color.as_deref(),
            self.config.theme.light_text_color.as_deref(),
        )
    }

    fn is_rendered(&self, row: &Element, icon: &IconHandle) -> bool {
        let Some(target) = self.icon_element(row) else {
            return false;
        };
        if !target.class_list().contains(&self.config.hide_class) {
            return false;
        }
        dom::find(&target, &format!("img[{}]", ICON_ATTR))
            .and_then(|img| img.get_attribute("src"))
            .is_some_and(|src| src == icon.url)
    }

    fn inject_icon(&self, row: &Element, icon: &IconHandle) -> ProviderResult<()> {
        let target = self
            .icon_element(row)
            .ok_or_else(|| ProviderError::SelectorMiss(self.config.selectors.icon.clone()))?;
        let img = self.create_icon(icon)?;

        let classes = target.class_list();
        if !classes.contains(&self.config.hide_class) {
            classes
                .add_1(&self.config.hide_class)
                .map_err(|e| ProviderError::DomRejected(js_message(&e)))?;
        }

        // The host icon element stays in place; only its content is swapped.
        let result = match target.first_child() {
            Some(first) => target.replace_child(&img, &first),
            None => target.append_child(&img),
        };
        result.map_err(|e| ProviderError::DomRejected(js_message(&e)))?;
        Ok(())
    }

    fn on_row_observed(&self, row: &Element, resync: &Resync) -> ProviderResult<()> {
        resync.session().style().ensure(|| {
            dom::insert_style_rule(&self.document, STYLE_ELEMENT_ID, &self.config.hide_rule())
        })?;

        if !self.is_observing(row) {
            let observation = observer::observe(row, self.config.observe, None, resync.clone())?;
            self.observers.borrow_mut().push((row.clone(), observation));
        }
        Ok(())
    }

    fn on_row_released(&self, row: &Element) {
        // Dropping the observation disconnects it.
        self.observers
            .borrow_mut()
            .retain(|(observed, _)| observed != row);
    }
}
