use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    error::{Error, Result},
    graph::Graph,
};

/// A singleton managed by [`Services`]
pub trait Service: Send + Sync + 'static {
    /// Called once by [`Services::dispose`]
    fn dispose(&self) {}
}

/// Typed name of a service.
///
/// ```
/// use pulse_services::{Service, ServiceId};
///
/// struct Clock;
/// impl Service for Clock {}
///
/// const CLOCK: ServiceId<Clock> = ServiceId::new("clock");
/// assert_eq!(CLOCK.to_string(), "clock");
/// ```
pub struct ServiceId<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ServiceId<T> {
    pub const fn new(name: &'static str) -> Self { Self { name, _marker: PhantomData } }

    pub fn name(&self) -> &'static str { self.name }

    /// Untyped form, used to declare dependencies
    pub fn dependency(&self) -> Dependency { Dependency(self.name) }
}

impl<T> Clone for ServiceId<T> {
    fn clone(&self) -> Self { *self }
}

impl<T> Copy for ServiceId<T> {}

impl<T> std::fmt::Display for ServiceId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.name) }
}

impl<T> std::fmt::Debug for ServiceId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "ServiceId({})", self.name) }
}

/// Untyped service name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dependency(&'static str);

impl<T> From<ServiceId<T>> for Dependency {
    fn from(id: ServiceId<T>) -> Self { id.dependency() }
}

struct Instance {
    any: Arc<dyn Any + Send + Sync>,
    service: Arc<dyn Service>,
}

impl Instance {
    fn new<T: Service>(service: Arc<T>) -> Self { Self { any: service.clone(), service } }

    fn downcast<T: Service>(&self, name: &'static str) -> Result<Arc<T>> {
        self.any.clone().downcast::<T>().map_err(|_| Error::TypeMismatch(name))
    }
}

type Factory = Box<dyn Fn(&Accessor<'_>) -> anyhow::Result<Instance> + Send + Sync>;

struct Registration {
    dependencies: Vec<&'static str>,
    factory: Factory,
}

/// Read access to the already constructed dependencies of a service
pub struct Accessor<'a> {
    requester: &'static str,
    dependencies: &'a [&'static str],
    instances: &'a HashMap<&'static str, Instance>,
}

impl Accessor<'_> {
    pub fn get<T: Service>(&self, id: ServiceId<T>) -> Result<Arc<T>> {
        if !self.dependencies.contains(&id.name) {
            return Err(Error::Undeclared { service: self.requester, dependency: id.name });
        }
        self.instances.get(id.name).ok_or(Error::NotRegistered(id.name))?.downcast(id.name)
    }
}

/// Registry of singleton services.
///
/// An explicit context object: create one per application (or test) and pass it
/// to whoever needs it. Services are built lazily, dependencies first.
///
/// ```
/// use std::sync::Arc;
/// use pulse_services::*;
///
/// struct Config { url: String }
/// impl Service for Config {}
///
/// struct Client { url: String }
/// impl Service for Client {}
///
/// const CONFIG: ServiceId<Config> = ServiceId::new("config");
/// const CLIENT: ServiceId<Client> = ServiceId::new("client");
///
/// let mut services = Services::new();
/// services.register(CLIENT, &[CONFIG.into()], |s| Ok(Client { url: s.get(CONFIG)?.url.clone() }));
/// services.register(CONFIG, &[], |_| Ok(Config { url: "db://local".into() }));
///
/// let client: Arc<Client> = services.get(CLIENT)?;
/// assert_eq!(client.url, "db://local");
/// # Ok::<(), pulse_services::Error>(())
/// ```
#[derive(Default)]
pub struct Services {
    registry: HashMap<&'static str, Registration>,
    instances: HashMap<&'static str, Instance>,
    /// Names in construction order
    created: Vec<&'static str>,
}

impl Services {
    pub fn new() -> Self { Self::default() }

    /// Registers how to build a singleton. `dependencies` lists every service the
    /// factory reads through its [`Accessor`].
    pub fn register<T, F>(&mut self, id: ServiceId<T>, dependencies: &[Dependency], factory: F)
    where
        T: Service,
        F: Fn(&Accessor<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        trace!("registering {id}");
        let factory: Factory = Box::new(move |accessor: &Accessor<'_>| factory(accessor).map(|service| Instance::new(Arc::new(service))));
        self.registry.insert(id.name, Registration { dependencies: dependencies.iter().map(|d| d.0).collect(), factory });
    }

    /// Provides a ready-made singleton, replacing any existing instance
    pub fn set<T: Service>(&mut self, id: ServiceId<T>, service: T) {
        self.created.retain(|name| *name != id.name);
        self.created.push(id.name);
        self.instances.insert(id.name, Instance::new(Arc::new(service)));
    }

    pub fn is_registered<T>(&self, id: ServiceId<T>) -> bool { self.registry.contains_key(id.name) || self.instances.contains_key(id.name) }

    pub fn is_created<T>(&self, id: ServiceId<T>) -> bool { self.instances.contains_key(id.name) }

    /// Returns the singleton, building it and its transitive dependencies if needed
    pub fn get<T: Service>(&mut self, id: ServiceId<T>) -> Result<Arc<T>> {
        self.ensure(id.name)?;
        self.instances.get(id.name).ok_or(Error::NotRegistered(id.name))?.downcast(id.name)
    }

    /// Builds something that is not registered itself but depends on services
    pub fn initialize<T>(&mut self, dependencies: &[Dependency], f: impl FnOnce(&Accessor<'_>) -> anyhow::Result<T>) -> Result<T> {
        for dependency in dependencies {
            self.ensure(dependency.0)?;
        }
        let dependencies: Vec<_> = dependencies.iter().map(|d| d.0).collect();
        let accessor = Accessor { requester: "<initialize>", dependencies: &dependencies, instances: &self.instances };
        f(&accessor).map_err(|source| Error::Factory { name: "<initialize>", source })
    }

    /// Disposes every instance, most recently created first, and forgets them.
    /// Registrations are kept, so services can be built again.
    pub fn dispose(&mut self) {
        for name in self.created.drain(..).rev() {
            if let Some(instance) = self.instances.remove(name) {
                debug!("disposing {name}");
                instance.service.dispose();
            }
        }
        self.instances.clear();
    }

    fn ensure(&mut self, name: &'static str) -> Result<()> {
        if self.instances.contains_key(name) {
            return Ok(());
        }
        if !self.registry.contains_key(name) {
            return Err(Error::NotRegistered(name));
        }

        let mut graph = self.dependency_graph(name)?;
        loop {
            let roots = graph.roots();
            if roots.is_empty() {
                if graph.is_empty() {
                    return Ok(());
                }
                return Err(Error::Cycle(graph.find_cycle().unwrap_or_else(|| name.to_string())));
            }
            for root in roots {
                self.create(root)?;
                graph.remove(root);
            }
        }
    }

    /// Collects `name` and every dependency that still needs building
    fn dependency_graph(&self, name: &'static str) -> Result<Graph> {
        let mut graph = Graph::default();
        let mut stack = vec![name];
        let mut seen = std::collections::HashSet::new();

        while let Some(item) = stack.pop() {
            if !seen.insert(item) {
                continue;
            }
            graph.node(item);
            let registration = self.registry.get(item).ok_or(Error::NotRegistered(item))?;
            for dependency in &registration.dependencies {
                let dependency = *dependency;
                if self.instances.contains_key(dependency) {
                    continue;
                }
                if !self.registry.contains_key(dependency) {
                    return Err(Error::NotRegistered(dependency));
                }
                graph.link(item, dependency);
                stack.push(dependency);
            }
        }
        Ok(graph)
    }

    fn create(&mut self, name: &'static str) -> Result<()> {
        let registration = self.registry.get(name).ok_or(Error::NotRegistered(name))?;
        debug!("creating {name}");
        let accessor = Accessor { requester: name, dependencies: &registration.dependencies, instances: &self.instances };
        let instance = (registration.factory)(&accessor).map_err(|source| Error::Factory { name, source })?;
        self.instances.insert(name, instance);
        self.created.push(name);
        Ok(())
    }
}

impl Drop for Services {
    fn drop(&mut self) { self.dispose() }
}
