use crate::module::ModuleContract;
use serde::Serialize;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Descriptor of a module input contract.
///
/// Equality and hashing only look at the type key; the name is kept for
/// diagnostics.
#[derive(Clone, Copy, Serialize)]
pub struct ContractId {
    #[serde(skip)]
    key: TypeId,
    name: &'static str,
}

impl ContractId {
    pub fn of<C: ModuleContract>() -> Self {
        Self {
            key: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ContractId {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ContractId {}

impl Hash for ContractId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContractId").field(&self.name).finish()
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Descriptor of the capability a destination exposes (usually a `dyn Trait`).
#[derive(Clone, Copy, Serialize)]
pub struct CapabilityId {
    #[serde(skip)]
    key: TypeId,
    name: &'static str,
}

impl CapabilityId {
    pub fn of<D: ?Sized + 'static>() -> Self {
        Self {
            key: TypeId::of::<D>(),
            name: std::any::type_name::<D>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for CapabilityId {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CapabilityId {}

impl Hash for CapabilityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CapabilityId").field(&self.name).finish()
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Key of a routable module: the input contract plus the capability its
/// destination provides. Two identities are equal iff both parts match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ModuleIdentity {
    pub contract: ContractId,
    pub capability: CapabilityId,
}

impl ModuleIdentity {
    pub fn of<C: ModuleContract>() -> Self {
        Self {
            contract: ContractId::of::<C>(),
            capability: CapabilityId::of::<C::Destination>(),
        }
    }

    /// Whether a destination made for `other` can stand in for one made for `self`.
    pub fn shares_capability(&self, other: &ModuleIdentity) -> bool {
        self.capability == other.capability
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.contract, self.capability)
    }
}

/// Typed handle used at call sites to name a module contract,
/// e.g. `RoutableModule::<LoginModuleInput>::new()`.
pub struct RoutableModule<C: ModuleContract> {
    _contract: PhantomData<fn() -> C>,
}

impl<C: ModuleContract> RoutableModule<C> {
    pub fn new() -> Self {
        Self {
            _contract: PhantomData,
        }
    }

    pub fn identity(&self) -> ModuleIdentity {
        ModuleIdentity::of::<C>()
    }
}

impl<C: ModuleContract> Default for RoutableModule<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ModuleContract> Clone for RoutableModule<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ModuleContract> Copy for RoutableModule<C> {}

impl<C: ModuleContract> fmt::Debug for RoutableModule<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RoutableModule")
            .field(&ContractId::of::<C>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{CompletionSlot, ModuleInstance};

    trait Greeter: Send + Sync {}
    trait Farewell: Send + Sync {}

    #[derive(Default)]
    struct GreeterModule {
        completion: CompletionSlot<dyn Greeter>,
    }

    impl ModuleInstance for GreeterModule {
        type Destination = dyn Greeter;

        fn completion_slot(&mut self) -> &mut CompletionSlot<dyn Greeter> {
            &mut self.completion
        }
    }

    #[derive(Default)]
    struct FarewellModule {
        completion: CompletionSlot<dyn Farewell>,
    }

    impl ModuleInstance for FarewellModule {
        type Destination = dyn Farewell;

        fn completion_slot(&mut self) -> &mut CompletionSlot<dyn Farewell> {
            &mut self.completion
        }
    }

    struct GreeterInput;
    impl ModuleContract for GreeterInput {
        type Module = GreeterModule;
        type Destination = dyn Greeter;
    }

    struct GreeterBridgeInput;
    impl ModuleContract for GreeterBridgeInput {
        type Module = GreeterModule;
        type Destination = dyn Greeter;
    }

    struct FarewellInput;
    impl ModuleContract for FarewellInput {
        type Module = FarewellModule;
        type Destination = dyn Farewell;
    }

    #[test]
    fn test_identity_equality() {
        assert_eq!(
            RoutableModule::<GreeterInput>::new().identity(),
            ModuleIdentity::of::<GreeterInput>()
        );
        assert_ne!(
            ModuleIdentity::of::<GreeterInput>(),
            ModuleIdentity::of::<GreeterBridgeInput>()
        );
        assert_ne!(
            ModuleIdentity::of::<GreeterInput>(),
            ModuleIdentity::of::<FarewellInput>()
        );
    }

    #[test]
    fn test_shares_capability() {
        let greeter = ModuleIdentity::of::<GreeterInput>();
        let bridge = ModuleIdentity::of::<GreeterBridgeInput>();
        let farewell = ModuleIdentity::of::<FarewellInput>();

        assert!(greeter.shares_capability(&bridge));
        assert!(!greeter.shares_capability(&farewell));
    }

    #[test]
    fn test_display_names_both_parts() {
        let rendered = ModuleIdentity::of::<GreeterInput>().to_string();
        assert!(rendered.contains("GreeterInput"));
        assert!(rendered.contains("Greeter"));
        assert!(rendered.contains(" -> "));
    }
}
