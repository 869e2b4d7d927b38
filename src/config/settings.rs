//! In-memory settings tree and JSON/XML loading.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::Value;

use super::scope::ConfigScope;

/// Error loading a settings file.
#[derive(Debug)]
pub enum SettingsError {
    /// Failed to read the file
    Io(std::io::Error),
    /// File is not valid JSON
    Json(serde_json::Error),
    /// File is not valid XML
    Xml(quick_xml::Error),
    /// Top level JSON value is not an object, or the XML has no root element
    NotAnObject,
    /// File extension is not a supported settings format
    UnsupportedFormat(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "Failed to read settings: {}", e),
            SettingsError::Json(e) => write!(f, "Invalid settings JSON: {}", e),
            SettingsError::Xml(e) => write!(f, "Invalid settings XML: {}", e),
            SettingsError::NotAnObject => {
                write!(f, "Settings root must be a JSON object or an XML element")
            }
            SettingsError::UnsupportedFormat(ext) => {
                write!(f, "Unsupported settings format: {}", ext)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e)
    }
}

impl From<quick_xml::Error> for SettingsError {
    fn from(e: quick_xml::Error) -> Self {
        SettingsError::Xml(e)
    }
}

/// One group of the settings tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsNode {
    values: BTreeMap<String, String>,
    groups: BTreeMap<String, SettingsNode>,
}

impl SettingsNode {
    fn from_json(object: &serde_json::Map<String, Value>) -> Self {
        let mut node = SettingsNode::default();
        for (key, value) in object {
            node.insert_json(key.clone(), value);
        }
        node
    }

    fn insert_json(&mut self, key: String, value: &Value) {
        match value {
            Value::Null => {}
            Value::Bool(b) => {
                self.values.insert(key, b.to_string());
            }
            Value::Number(n) => {
                self.values.insert(key, n.to_string());
            }
            Value::String(s) => {
                self.values.insert(key, s.clone());
            }
            Value::Object(map) => {
                self.groups.insert(key, SettingsNode::from_json(map));
            }
            Value::Array(items) => {
                // Arrays become groups named by index
                let mut group = SettingsNode::default();
                for (i, item) in items.iter().enumerate() {
                    group.insert_json(i.to_string(), item);
                }
                group.values.insert("size".to_string(), items.len().to_string());
                self.groups.insert(key, group);
            }
        }
    }

    fn descend<'a, I>(&self, segments: I) -> Option<&SettingsNode>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut node = self;
        for segment in segments {
            node = node.groups.get(segment)?;
        }
        Some(node)
    }

    fn find_mut<'a, I>(&mut self, segments: I) -> Option<&mut SettingsNode>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut node = self;
        for segment in segments {
            node = node.groups.get_mut(segment)?;
        }
        Some(node)
    }

    /// Creates missing groups along the way.
    fn descend_mut<'a, I>(&mut self, segments: I) -> &mut SettingsNode
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut node = self;
        for segment in segments {
            node = node.groups.entry(segment.to_string()).or_default();
        }
        node
    }
}

/// XML element being read, before it is attached to its parent.
struct XmlElement {
    name: String,
    node: SettingsNode,
    text: String,
    has_children: bool,
}

impl XmlElement {
    /// Attributes become values of the element's group.
    fn open(start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut node = SettingsNode::default();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            node.values.insert(key, value);
        }

        Ok(Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            node,
            text: String::new(),
            has_children: false,
        })
    }

    /// Leaf elements without attributes are values, everything else a group.
    fn attach_to(self, parent: &mut SettingsNode) {
        if !self.has_children && self.node.values.is_empty() {
            parent.values.insert(self.name, self.text);
        } else {
            parent.groups.insert(self.name, self.node);
        }
    }
}

/// Build a tree from the children and attributes of the document element.
///
/// A repeated element name keeps the last occurrence.
fn node_from_xml(xml: &str) -> Result<Option<SettingsNode>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root = None;

    let mut close = |stack: &mut Vec<XmlElement>, element: XmlElement| match stack.last_mut() {
        Some(parent) => {
            parent.has_children = true;
            element.attach_to(&mut parent.node);
        }
        None => root = Some(element.node),
    };

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(XmlElement::open(&start)?),
            Event::Empty(start) => {
                let element = XmlElement::open(&start)?;
                close(&mut stack, element);
            }
            Event::Text(text) => {
                if let Some(element) = stack.last_mut() {
                    element.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(element) = stack.last_mut() {
                    element.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    close(&mut stack, element);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(root)
}

fn split_key(key: &str) -> Vec<&str> {
    key.split('/').filter(|s| !s.is_empty()).collect()
}

/// Hierarchical settings with a current group stack.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    root: SettingsNode,
    path: Vec<String>,
    /// Segments pushed by each `begin_group`, innermost last.
    entered: Vec<usize>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Settings::set_value`].
    pub fn with_value(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_value(key, value);
        self
    }

    /// Parse settings from a JSON document.
    ///
    /// Objects become groups, scalars become values and arrays become groups
    /// named by index with a `size` value.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let value: Value = serde_json::from_str(json)?;
        match value {
            Value::Object(map) => Ok(Self {
                root: SettingsNode::from_json(&map),
                ..Self::default()
            }),
            _ => Err(SettingsError::NotAnObject),
        }
    }

    /// Parse settings from an XML document.
    ///
    /// The document element is the root group. Nested elements with children
    /// or attributes become groups, attributes and text-only elements become
    /// values.
    pub fn from_xml_str(xml: &str) -> Result<Self, SettingsError> {
        let root = node_from_xml(xml)?.ok_or(SettingsError::NotAnObject)?;
        Ok(Self {
            root,
            ..Self::default()
        })
    }

    /// Load settings from a `.json` or `.xml` file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Self::from_json_str(&fs::read_to_string(path)?),
            "xml" => Self::from_xml_str(&fs::read_to_string(path)?),
            _ => Err(SettingsError::UnsupportedFormat(ext)),
        }
    }

    /// Store `value` under `key`, relative to the current group, creating
    /// intermediate groups as needed.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) {
        let mut segments = split_key(key);
        let Some(name) = segments.pop() else {
            return;
        };
        let node = self
            .root
            .descend_mut(self.path.iter().map(String::as_str).chain(segments));
        node.values.insert(name.to_string(), value.into());
    }

    /// Remove a value or a whole group, relative to the current group.
    /// Missing paths are left untouched.
    pub fn remove(&mut self, key: &str) {
        let mut segments = split_key(key);
        let Some(name) = segments.pop() else {
            return;
        };
        let path = self.path.iter().map(String::as_str).chain(segments);
        let Some(node) = self.root.find_mut(path) else {
            return;
        };
        node.values.remove(name);
        node.groups.remove(name);
    }

    /// The group currently entered, if it exists in the tree.
    pub fn current(&self) -> Option<&SettingsNode> {
        self.root.descend(self.path.iter().map(String::as_str))
    }
}

impl ConfigScope for Settings {
    fn value(&self, key: &str) -> Option<String> {
        let mut segments = split_key(key);
        let name = segments.pop()?;
        self.current()?.descend(segments)?.values.get(name).cloned()
    }

    fn contains_group(&self, name: &str) -> bool {
        self.current()
            .and_then(|node| node.descend(split_key(name)))
            .is_some()
    }

    fn begin_group(&mut self, name: &str) {
        let segments = split_key(name);
        self.entered.push(segments.len());
        self.path.extend(segments.into_iter().map(String::from));
    }

    fn end_group(&mut self) {
        if let Some(count) = self.entered.pop() {
            self.path.truncate(self.path.len() - count);
        }
    }

    fn group_path(&self) -> String {
        self.path.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Mode": "DualCamera",
        "PatternProjection": { "Width": 1280, "Height": 800, "Inverted": true },
        "Cameras": {
            "Left": { "Name": "cam-left" },
            "Right": { "Name": "cam-right" }
        },
        "Tags": ["a", "b"],
        "Unused": null
    }"#;

    #[test]
    fn test_from_json_values_and_groups() {
        let settings = Settings::from_json_str(SAMPLE).unwrap();
        assert_eq!(settings.value("Mode").as_deref(), Some("DualCamera"));
        assert_eq!(settings.value("PatternProjection/Width").as_deref(), Some("1280"));
        assert_eq!(settings.value("PatternProjection/Inverted").as_deref(), Some("true"));
        assert_eq!(settings.value("Cameras/Right/Name").as_deref(), Some("cam-right"));
        assert_eq!(settings.value("Tags/1").as_deref(), Some("b"));
        assert_eq!(settings.value("Tags/size").as_deref(), Some("2"));
        assert!(settings.value("Unused").is_none());
        assert!(settings.contains_group("Cameras/Left"));
        assert!(!settings.contains_group("Camera"));
    }

    #[test]
    fn test_non_object_root_rejected() {
        assert!(matches!(
            Settings::from_json_str("[1, 2]"),
            Err(SettingsError::NotAnObject)
        ));
    }

    #[test]
    fn test_lookup_relative_to_current_group() {
        let mut settings = Settings::from_json_str(SAMPLE).unwrap();
        settings.begin_group("Cameras");
        assert_eq!(settings.value("Left/Name").as_deref(), Some("cam-left"));
        assert!(settings.value("Mode").is_none());

        settings.begin_group("Missing");
        assert!(settings.value("Name").is_none());
        assert_eq!(settings.group_path(), "Cameras/Missing");

        settings.end_group();
        settings.end_group();
        settings.end_group();
        assert_eq!(settings.group_path(), "");
        assert_eq!(settings.value("Mode").as_deref(), Some("DualCamera"));
    }

    #[test]
    fn test_set_and_remove() {
        let mut settings = Settings::new().with_value("Camera/Name", "cam");
        settings.begin_group("Camera");
        settings.set_value("Width", "640");
        settings.end_group();
        assert_eq!(settings.value("Camera/Width").as_deref(), Some("640"));

        settings.remove("Camera");
        assert!(!settings.contains_group("Camera"));
    }

    #[test]
    fn test_begin_group_with_nested_path() {
        let mut settings = Settings::from_json_str(SAMPLE).unwrap();
        settings.begin_group("Cameras/Left");
        assert_eq!(settings.group_path(), "Cameras/Left");
        assert_eq!(settings.value("Name").as_deref(), Some("cam-left"));

        settings.set_value("Width", "640");
        settings.begin_group("");
        settings.end_group();
        assert_eq!(settings.group_path(), "Cameras/Left");

        settings.end_group();
        assert_eq!(settings.group_path(), "");
        assert_eq!(settings.value("Cameras/Left/Width").as_deref(), Some("640"));
        assert!(!settings.contains_group("Cameras/Left/Cameras"));
    }

    #[test]
    fn test_remove_missing_path_creates_nothing() {
        let mut settings = Settings::new();
        settings.remove("Ghost/Key");
        assert!(!settings.contains_group("Ghost"));

        settings.begin_group("Scanner");
        settings.remove("PatternProjection/Width");
        settings.end_group();
        assert!(!settings.contains_group("Scanner"));
    }

    #[test]
    fn test_from_xml_values_and_groups() {
        let settings = Settings::from_xml_str(
            r#"<?xml version="1.0"?>
            <Settings>
                <Mode>Projector+Camera</Mode>
                <StereoCalibration><ConfigFile>calib &amp; pose.xml</ConfigFile></StereoCalibration>
                <PatternProjection Type="GrayCode" Width="1280" Height="800"/>
                <Camera>
                    <Name>cam</Name>
                    <Width>640</Width>
                </Camera>
                <Empty/>
            </Settings>"#,
        )
        .unwrap();

        assert_eq!(settings.value("Mode").as_deref(), Some("Projector+Camera"));
        assert_eq!(
            settings.value("StereoCalibration/ConfigFile").as_deref(),
            Some("calib & pose.xml")
        );
        assert!(settings.contains_group("PatternProjection"));
        assert_eq!(settings.value("PatternProjection/Width").as_deref(), Some("1280"));
        assert_eq!(settings.value("Camera/Name").as_deref(), Some("cam"));
        assert_eq!(settings.value("Empty").as_deref(), Some(""));
    }

    #[test]
    fn test_xml_errors() {
        assert!(matches!(
            Settings::from_xml_str("<Settings><Mode>x</Settings>"),
            Err(SettingsError::Xml(_))
        ));
        assert!(matches!(Settings::from_xml_str(""), Err(SettingsError::NotAnObject)));
    }

    #[test]
    fn test_load_xml_file() {
        let path = std::env::temp_dir().join(format!("stereo_sls_settings_{}.xml", std::process::id()));
        fs::write(&path, "<Settings><Mode>DualCamera</Mode></Settings>").unwrap();
        let settings = Settings::load(&path);
        let _ = fs::remove_file(&path);
        assert_eq!(settings.unwrap().value("Mode").as_deref(), Some("DualCamera"));
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let err = Settings::load(Path::new("settings.ini")).unwrap_err();
        assert!(matches!(err, SettingsError::UnsupportedFormat(ext) if ext == "ini"));
    }
}
