//! The fixed set of audio objects the plug-in publishes.

use crate::abi::{
    kAudioObjectPlugInObject, kAudioObjectPropertyScopeInput, kAudioObjectPropertyScopeOutput,
    AudioObjectID, AudioObjectPropertyScope,
};

pub const DEVICE_ID: AudioObjectID = 2;
pub const INPUT_STREAM_ID: AudioObjectID = 3;
pub const OUTPUT_STREAM_ID: AudioObjectID = 4;
pub const INPUT_VOLUME_ID: AudioObjectID = 5;
pub const OUTPUT_VOLUME_ID: AudioObjectID = 6;
pub const INPUT_MUTE_ID: AudioObjectID = 7;
pub const OUTPUT_MUTE_ID: AudioObjectID = 8;

/// Direction of a stream or control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Device → host (capture).
    Input,
    /// Host → device (playback).
    Output,
}

impl Direction {
    /// Property scope matching this direction.
    #[must_use]
    pub fn scope(self) -> AudioObjectPropertyScope {
        match self {
            Self::Input => kAudioObjectPropertyScopeInput,
            Self::Output => kAudioObjectPropertyScopeOutput,
        }
    }

    /// Value of the stream direction property (input = 1, output = 0).
    #[must_use]
    pub fn stream_direction(self) -> u32 {
        match self {
            Self::Input => 1,
            Self::Output => 0,
        }
    }

    /// Parses a direction-specific scope. Global and unknown scopes yield `None`.
    #[must_use]
    pub fn from_scope(scope: AudioObjectPropertyScope) -> Option<Self> {
        match scope {
            kAudioObjectPropertyScopeInput => Some(Self::Input),
            kAudioObjectPropertyScopeOutput => Some(Self::Output),
            _ => None,
        }
    }

    fn pick(self, input: AudioObjectID, output: AudioObjectID) -> AudioObjectID {
        match self {
            Self::Input => input,
            Self::Output => output,
        }
    }
}

/// One of the objects in the plug-in's object tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioObject {
    PlugIn,
    Device,
    Stream(Direction),
    Volume(Direction),
    Mute(Direction),
}

impl AudioObject {
    /// Every object, in id order.
    pub const ALL: [Self; 8] = [
        Self::PlugIn,
        Self::Device,
        Self::Stream(Direction::Input),
        Self::Stream(Direction::Output),
        Self::Volume(Direction::Input),
        Self::Volume(Direction::Output),
        Self::Mute(Direction::Input),
        Self::Mute(Direction::Output),
    ];

    /// Resolves an object id.
    #[must_use]
    pub fn from_id(id: AudioObjectID) -> Option<Self> {
        Self::ALL.into_iter().find(|object| object.id() == id)
    }

    /// Stable id of this object.
    #[must_use]
    pub fn id(self) -> AudioObjectID {
        match self {
            Self::PlugIn => kAudioObjectPlugInObject,
            Self::Device => DEVICE_ID,
            Self::Stream(dir) => dir.pick(INPUT_STREAM_ID, OUTPUT_STREAM_ID),
            Self::Volume(dir) => dir.pick(INPUT_VOLUME_ID, OUTPUT_VOLUME_ID),
            Self::Mute(dir) => dir.pick(INPUT_MUTE_ID, OUTPUT_MUTE_ID),
        }
    }

    /// Direction of streams and controls; `None` for the plug-in and device.
    #[must_use]
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::PlugIn | Self::Device => None,
            Self::Stream(dir) | Self::Volume(dir) | Self::Mute(dir) => Some(dir),
        }
    }

    /// Whether the object exists only while the device is published.
    #[must_use]
    pub fn belongs_to_device(self) -> bool {
        !matches!(self, Self::PlugIn)
    }
}

/// A short list of object ids held inline, so property reads never allocate.
/// Sized for the whole object tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectList {
    ids: [AudioObjectID; AudioObject::ALL.len()],
    len: usize,
}

impl ObjectList {
    /// An empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ids: [0; AudioObject::ALL.len()],
            len: 0,
        }
    }

    /// A list holding one id.
    #[must_use]
    pub const fn one(id: AudioObjectID) -> Self {
        let mut list = Self::new();
        list.ids[0] = id;
        list.len = 1;
        list
    }

    /// Appends an id. Ids past the capacity are dropped; the tree never has
    /// more objects than that.
    pub fn push(&mut self, id: AudioObjectID) {
        if let Some(slot) = self.ids.get_mut(self.len) {
            *slot = id;
            self.len += 1;
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[AudioObjectID] {
        &self.ids[..self.len]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl FromIterator<AudioObjectID> for ObjectList {
    fn from_iter<I: IntoIterator<Item = AudioObjectID>>(iter: I) -> Self {
        let mut list = Self::new();
        for id in iter {
            list.push(id);
        }
        list
    }
}

/// Keeps ids whose direction matches `scope`. Global keeps everything.
pub(crate) fn filter_by_scope<'a>(
    objects: impl IntoIterator<Item = &'a AudioObject>,
    scope: AudioObjectPropertyScope,
) -> ObjectList {
    let wanted = Direction::from_scope(scope);
    objects
        .into_iter()
        .filter(|object| match (wanted, object.direction()) {
            (None, _) => true,
            (Some(want), Some(dir)) => want == dir,
            (Some(_), None) => false,
        })
        .map(|object| object.id())
        .collect()
}
