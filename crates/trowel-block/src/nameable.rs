use crate::entity::{ensure_compound, tag_name};
use crate::{BlockEntityError, BlockEntityResult};
use tracing::debug;
use trowel_nbt::NbtValue;
use trowel_types::TextComponent;

/// Optional player-given name, from a renamed item placed as a block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomName {
    name: Option<TextComponent>,
}

impl CustomName {
    pub fn get(&self) -> Option<&TextComponent> {
        self.name.as_ref()
    }

    pub fn set(&mut self, name: Option<TextComponent>) {
        self.name = name;
    }

    /// `CustomName` holds JSON text. Text that is not valid JSON is kept
    /// as a plain literal.
    pub fn import_nbt(&mut self, nbt: &NbtValue) -> BlockEntityResult<()> {
        ensure_compound(nbt)?;
        let Some(raw) = nbt.get("CustomName") else {
            return Ok(());
        };
        let json = raw.as_str().ok_or_else(|| BlockEntityError::TypeMismatch {
            expected: "string",
            found: tag_name(raw).to_string(),
        })?;
        self.name = Some(TextComponent::from_json(json).unwrap_or_else(|err| {
            debug!(%err, "CustomName is not JSON text, using it verbatim");
            TextComponent::plain(json)
        }));
        Ok(())
    }
}

/// Block entities that can carry a custom name.
pub trait Nameable {
    fn custom_name(&self) -> Option<&TextComponent>;

    fn set_custom_name(&mut self, name: Option<TextComponent>);

    fn has_custom_name(&self) -> bool {
        self.custom_name().is_some()
    }

    /// The custom name as plain text, or `default` when there is none.
    fn display_name(&self, default: &str) -> String {
        self.custom_name()
            .map(TextComponent::flatten)
            .unwrap_or_else(|| default.to_string())
    }
}
