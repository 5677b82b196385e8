use jobfill_common::dom::ElementInfo;
use serde::Serialize;
use std::fmt;

/// Input `type`s written through `value` + an `input` event.
pub const TEXT_LIKE_TYPES: &[&str] = &["text", "email", "tel", "number", "search"];

/// Input `type`s written through `checked` + a `change` event.
pub const BOOLEAN_TYPES: &[&str] = &["checkbox", "radio"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    TextLike,
    Boolean,
    NativeSelect,
    NativeMultiSelect,
    TextArea,
    StaticCustomDropdown,
    RemoteCustomDropdown,
    Unhandled,
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WidgetKind::TextLike => "text input",
            WidgetKind::Boolean => "checkbox/radio",
            WidgetKind::NativeSelect => "select",
            WidgetKind::NativeMultiSelect => "multi-select",
            WidgetKind::TextArea => "textarea",
            WidgetKind::StaticCustomDropdown => "custom dropdown",
            WidgetKind::RemoteCustomDropdown => "remote dropdown",
            WidgetKind::Unhandled => "unhandled",
        };
        f.write_str(name)
    }
}

/// Pick the write strategy for an element. First match wins:
/// marker class, then text-like input, boolean input, select, textarea.
pub fn classify(info: &ElementInfo, marker_class: &str) -> WidgetKind {
    if info.has_class(marker_class) {
        if info.is_tag("select") {
            return WidgetKind::StaticCustomDropdown;
        }
        if info.attribute("data-url").is_some() {
            return WidgetKind::RemoteCustomDropdown;
        }
        return WidgetKind::Unhandled;
    }

    if info.is_tag("input") {
        // A missing type attribute means the HTML default, "text".
        let input_type = info.input_type.as_deref().unwrap_or("text");
        if TEXT_LIKE_TYPES
            .iter()
            .any(|t| t.eq_ignore_ascii_case(input_type))
        {
            return WidgetKind::TextLike;
        }
        if BOOLEAN_TYPES
            .iter()
            .any(|t| t.eq_ignore_ascii_case(input_type))
        {
            return WidgetKind::Boolean;
        }
        return WidgetKind::Unhandled;
    }

    if info.is_tag("select") {
        return if info.multiple {
            WidgetKind::NativeMultiSelect
        } else {
            WidgetKind::NativeSelect
        };
    }

    if info.is_tag("textarea") {
        return WidgetKind::TextArea;
    }

    WidgetKind::Unhandled
}
