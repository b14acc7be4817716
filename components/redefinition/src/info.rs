//! Redefinition requests and the change packets derived from them.

use std::fmt;

use object_model::KlassRef;

/// One class of a redefinition request: its name and replacement bytes.
#[derive(Clone)]
pub struct RedefineInfo {
    name: String,
    class_bytes: Vec<u8>,
}

impl RedefineInfo {
    /// Creates a request entry.
    pub fn new(name: impl Into<String>, class_bytes: Vec<u8>) -> Self {
        RedefineInfo {
            name: name.into(),
            class_bytes,
        }
    }

    /// Name of the class to redefine.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replacement class file bytes.
    pub fn class_bytes(&self) -> &[u8] {
        &self.class_bytes
    }
}

impl fmt::Debug for RedefineInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedefineInfo")
            .field("name", &self.name)
            .field("class_bytes", &self.class_bytes.len())
            .finish()
    }
}

/// A request entry after anonymous inner classes were matched against the
/// loaded state.
///
/// Matching may move an anonymous class to a different loaded class, so
/// `new_name` can differ from the name the class is currently loaded under.
#[derive(Clone)]
pub struct HotSwapClassInfo {
    klass: Option<KlassRef>,
    name: String,
    new_name: String,
    class_bytes: Vec<u8>,
}

impl HotSwapClassInfo {
    /// Info for a class that keeps its name. `klass` is `None` for a class
    /// that is not loaded yet.
    pub fn new(klass: Option<KlassRef>, name: impl Into<String>, class_bytes: Vec<u8>) -> Self {
        let name = name.into();
        HotSwapClassInfo {
            klass,
            new_name: name.clone(),
            name,
            class_bytes,
        }
    }

    /// Info for a loaded class that takes the name `new_name`.
    pub fn renamed(klass: KlassRef, new_name: impl Into<String>, class_bytes: Vec<u8>) -> Self {
        HotSwapClassInfo {
            name: klass.name(),
            klass: Some(klass),
            new_name: new_name.into(),
            class_bytes,
        }
    }

    /// The loaded class being redefined.
    pub fn klass(&self) -> Option<&KlassRef> {
        self.klass.as_ref()
    }

    /// Name the class is loaded under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name the class has after redefinition.
    pub fn new_name(&self) -> &str {
        &self.new_name
    }

    /// Replacement class file bytes.
    pub fn class_bytes(&self) -> &[u8] {
        &self.class_bytes
    }

    /// The class changes its name.
    pub fn is_renamed(&self) -> bool {
        self.name != self.new_name
    }
}

impl fmt::Debug for HotSwapClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotSwapClassInfo")
            .field("name", &self.name)
            .field("new_name", &self.new_name)
            .field("loaded", &self.klass.is_some())
            .finish()
    }
}

/// Kind of change a packet applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassChange {
    /// Bytes are identical to the loaded class
    NoChange,
    /// Only constant pool entries differ
    ConstantPoolChange,
    /// Method bodies differ
    MethodBodyChange,
    /// The class takes another name
    ClassNameChanged,
    /// The class was not loaded before
    NewClass,
}

/// One pending class redefinition with its detected delta.
#[derive(Debug, Clone)]
pub struct ChangePacket {
    /// The matched request entry
    pub info: HotSwapClassInfo,
    /// What changes
    pub change: ClassChange,
}

impl ChangePacket {
    /// Creates a packet.
    pub fn new(info: HotSwapClassInfo, change: ClassChange) -> Self {
        ChangePacket { info, change }
    }

    /// The loaded class the packet applies to.
    pub fn klass(&self) -> Option<&KlassRef> {
        self.info.klass()
    }
}
