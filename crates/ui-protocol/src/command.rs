//! Command vocabulary and batch builder

use crate::ScreenId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const TTL_NO_EXPIRE: i64 = -1;
const TTL_EXPIRE_ON_SCREEN_ENTER: i64 = -2;

/// Time-to-live of a rendered element value.
///
/// A TTL belongs to the command instance, not the element: every render
/// re-asserts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Expire after this many seconds.
    Seconds(u32),
    /// Live only while the owning screen stays active.
    ExpireOnScreenEnter,
    /// Never expires.
    NoExpire,
}

impl Ttl {
    /// Wire encoding: positive seconds, -1 no-expire, -2 expire-on-enter.
    pub fn as_wire(self) -> i64 {
        match self {
            Self::Seconds(secs) => i64::from(secs),
            Self::NoExpire => TTL_NO_EXPIRE,
            Self::ExpireOnScreenEnter => TTL_EXPIRE_ON_SCREEN_ENTER,
        }
    }

    /// Decode a wire value; zero and unknown sentinels are rejected.
    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            TTL_NO_EXPIRE => Some(Self::NoExpire),
            TTL_EXPIRE_ON_SCREEN_ENTER => Some(Self::ExpireOnScreenEnter),
            v if v > 0 => u32::try_from(v).ok().map(Self::Seconds),
            _ => None,
        }
    }
}

impl Serialize for Ttl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Ttl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Self::from_wire(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid ttl {}", value)))
    }
}

/// Identifies one element slot in a screen layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u8);

/// Screen-change transition animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Animation {
    None,
    SlideLeft,
    SlideRight,
}

/// Action triggered by a selectable list item or alert affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UiAction {
    /// Navigate to a screen.
    ChangeScreen { screen: ScreenId },
    /// Re-issue the invocation that rendered the current element.
    Refresh,
}

/// One row of a [`Command::SetList`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: u8,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_select: Option<UiAction>,
}

impl ListItem {
    pub fn new(id: u8, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            on_select: None,
        }
    }

    pub fn with_action(id: u8, text: impl Into<String>, action: UiAction) -> Self {
        Self {
            id,
            text: text.into(),
            on_select: Some(action),
        }
    }
}

/// A single declarative UI update.
///
/// `SetText`/`SetBitmap` without a `screen` apply to the currently
/// active screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    /// Switch the active screen.
    ChangeScreen {
        screen: ScreenId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        animation: Option<Animation>,
        #[serde(default, skip_serializing_if = "is_false")]
        alert: bool,
    },
    /// Render a text value into an element slot.
    SetText {
        element: ElementId,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        screen: Option<ScreenId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ttl: Option<Ttl>,
    },
    /// Render a bitmap resource into an element slot.
    SetBitmap {
        element: ElementId,
        resource: u16,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        screen: Option<ScreenId>,
    },
    /// Replace the selectable list shown on the active screen.
    SetList {
        items: Vec<ListItem>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ttl: Option<Ttl>,
    },
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Command {
    /// Screen change with no animation override and no alert.
    pub fn change_screen(screen: ScreenId) -> Self {
        Self::ChangeScreen {
            screen,
            animation: None,
            alert: false,
        }
    }

    /// Screen change that visibly notifies the wearer.
    pub fn change_screen_alert(screen: ScreenId) -> Self {
        Self::ChangeScreen {
            screen,
            animation: None,
            alert: true,
        }
    }

    /// Text update bound to a specific screen.
    pub fn text(screen: ScreenId, element: ElementId, value: impl Into<String>) -> Self {
        Self::SetText {
            element,
            value: value.into(),
            screen: Some(screen),
            ttl: None,
        }
    }

    /// Text update for the currently active screen.
    pub fn text_active(element: ElementId, value: impl Into<String>) -> Self {
        Self::SetText {
            element,
            value: value.into(),
            screen: None,
            ttl: None,
        }
    }

    /// Empty placeholder with a TTL, re-armed on every render pass.
    pub fn clear(screen: ScreenId, element: ElementId, ttl: Ttl) -> Self {
        Self::SetText {
            element,
            value: String::new(),
            screen: Some(screen),
            ttl: Some(ttl),
        }
    }
}

/// Ordered batch of commands returned by one invocation.
///
/// Content commands must be appended before the screen change that makes
/// them visible; insertion order is preserved through serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandBatch {
    commands: Vec<Command>,
}

impl CommandBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn append(&mut self, mut other: CommandBatch) {
        self.commands.append(&mut other.commands);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl From<Vec<Command>> for CommandBatch {
    fn from(commands: Vec<Command>) -> Self {
        Self { commands }
    }
}
