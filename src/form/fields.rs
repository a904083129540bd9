#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorButton {
    Up,
    Add,
    Remove,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSelectorOptions {
    pub buttons: &'static [SelectorButton],
    pub from_title: &'static str,
    pub to_title: &'static str,
    pub value_field: &'static str,
    pub display_field: &'static str,
    /// `None` submits the selection as a list rather than a joined string.
    pub delimiter: Option<char>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Checkbox,
    ItemSelector(ItemSelectorOptions),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Bool(bool),
    EmptyList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    pub default: FieldDefault,
    pub label: &'static str,
    pub help: &'static str,
}

pub fn find_field<'a>(fields: &'a [FieldDescriptor], name: &str) -> Option<&'a FieldDescriptor> {
    fields.iter().find(|field| field.name == name)
}
