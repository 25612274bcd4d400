// crates/cosem-rs-xml/src/pool.rs

//! Routes each operation to the adapters configured for it.
//!
//! Reads stop at the first adapter that succeeds. Type and template writes
//! must succeed on every routed adapter. Data writes go to all of them.

use crate::adapter::Adapter;
use crate::config::PoolConfig;
use crate::error::AdapterError;
use crate::library::CollectionId;
use crate::report::DecodeReport;
use cosem_rs::{Collection, ParameterValue, Template};
use log::{error, warn};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    CreateType,
    KeepData,
    GetData,
    GetCollection,
    CreateTemplate,
    GetTemplate,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::CreateType,
        Operation::KeepData,
        Operation::GetData,
        Operation::GetCollection,
        Operation::CreateTemplate,
        Operation::GetTemplate,
    ];

    /// Key of the operation in the `[pool]` configuration table.
    pub fn key(self) -> &'static str {
        match self {
            Operation::CreateType => "create_type",
            Operation::KeepData => "keep_data",
            Operation::GetData => "get_data",
            Operation::GetCollection => "get_collection",
            Operation::CreateTemplate => "create_template",
            Operation::GetTemplate => "get_template",
        }
    }

    fn configured(self, config: &PoolConfig) -> &[String] {
        match self {
            Operation::CreateType => &config.create_type,
            Operation::KeepData => &config.keep_data,
            Operation::GetData => &config.get_data,
            Operation::GetCollection => &config.get_collection,
            Operation::CreateTemplate => &config.create_template,
            Operation::GetTemplate => &config.get_template,
        }
    }
}

pub struct AdapterPool {
    adapters: Vec<Box<dyn Adapter>>,
    /// Indexes into `adapters`, in configured order.
    routes: BTreeMap<Operation, Vec<usize>>,
}

impl AdapterPool {
    /// Resolves the adapter names of `config` against `adapters`; unknown
    /// names are logged and ignored.
    pub fn new(adapters: Vec<Box<dyn Adapter>>, config: &PoolConfig) -> Self {
        let mut routes = BTreeMap::new();
        for operation in Operation::ALL {
            let mut route = Vec::new();
            for name in operation.configured(config) {
                match adapters.iter().position(|adapter| adapter.name() == name.as_str()) {
                    Some(index) => route.push(index),
                    None => warn!("No adapter named {name:?} for {}", operation.key()),
                }
            }
            routes.insert(operation, route);
        }
        Self { adapters, routes }
    }

    fn route(&self, operation: Operation) -> Result<Vec<usize>, AdapterError> {
        match self.routes.get(&operation) {
            Some(route) if !route.is_empty() => Ok(route.clone()),
            _ => Err(AdapterError::NoAdapter(operation.key())),
        }
    }

    /// Runs `call` on each routed adapter until one succeeds; the last
    /// error is returned when none does.
    fn first_success<T, F>(&mut self, operation: Operation, mut call: F) -> Result<T, AdapterError>
    where
        F: FnMut(&mut dyn Adapter) -> Result<T, AdapterError>,
    {
        let mut last_error = AdapterError::NoAdapter(operation.key());
        for index in self.route(operation)? {
            let adapter = &mut self.adapters[index];
            match call(adapter.as_mut()) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("{} failed on {}: {e}", operation.key(), adapter.name());
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    fn every<F>(&mut self, operation: Operation, mut call: F) -> Result<(), AdapterError>
    where
        F: FnMut(&mut dyn Adapter) -> Result<(), AdapterError>,
    {
        for index in self.route(operation)? {
            let adapter = &mut self.adapters[index];
            if let Err(e) = call(adapter.as_mut()) {
                error!("{} failed on {}: {e}", operation.key(), adapter.name());
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn create_type(&mut self, collection: &Collection) -> Result<(), AdapterError> {
        self.every(Operation::CreateType, |adapter| adapter.create_type(collection))
    }

    /// True when at least one adapter wrote a data document. Failures are
    /// logged; the last one is returned only if no adapter wrote.
    pub fn keep_data(
        &mut self,
        collection: &Collection,
        association_id: u8,
    ) -> Result<bool, AdapterError> {
        let mut kept = false;
        let mut last_error = None;
        for index in self.route(Operation::KeepData)? {
            let adapter = &mut self.adapters[index];
            match adapter.keep_data(collection, association_id) {
                Ok(wrote) => kept |= wrote,
                Err(e) => {
                    error!("keep_data failed on {}: {e}", adapter.name());
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) if !kept => Err(e),
            _ => Ok(kept),
        }
    }

    pub fn get_data(&mut self, collection: &mut Collection) -> Result<DecodeReport, AdapterError> {
        self.first_success(Operation::GetData, |adapter| adapter.get_data(collection))
    }

    pub fn get_collection(
        &mut self,
        manufacturer: &[u8],
        firm_id: &ParameterValue,
        firm_ver: &ParameterValue,
    ) -> Result<Collection, AdapterError> {
        self.first_success(Operation::GetCollection, |adapter| {
            adapter.get_collection(manufacturer, firm_id, firm_ver)
        })
    }

    pub fn create_template(&mut self, name: &str, template: &Template) -> Result<(), AdapterError> {
        self.every(Operation::CreateTemplate, |adapter| adapter.create_template(name, template))
    }

    pub fn get_template(&mut self, name: &str) -> Result<Template, AdapterError> {
        self.first_success(Operation::GetTemplate, |adapter| adapter.get_template(name))
    }

    /// Template names of the first adapter routed for `get_template`.
    pub fn template_names(&mut self) -> Result<Vec<String>, AdapterError> {
        self.first_success(Operation::GetTemplate, |adapter| adapter.template_names())
    }

    /// Stored identities of the first adapter routed for `get_collection`.
    pub fn collection_identifiers(&mut self) -> Result<Vec<CollectionId>, AdapterError> {
        self.first_success(Operation::GetCollection, |adapter| adapter.collection_identifiers())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaVersion;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Adapter that records its calls and fails when told to.
    struct Stub {
        name: &'static str,
        fails: bool,
        writes: bool,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl Stub {
        fn boxed(
            name: &'static str,
            fails: bool,
            calls: &Rc<RefCell<Vec<String>>>,
        ) -> Box<dyn Adapter> {
            Box::new(Stub {
                name,
                fails,
                writes: !fails,
                calls: Rc::clone(calls),
            })
        }

        fn record(&self, operation: &str) -> Result<(), AdapterError> {
            self.calls.borrow_mut().push(format!("{}:{operation}", self.name));
            if self.fails {
                Err(AdapterError::TemplateNotFound(self.name.to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl Adapter for Stub {
        fn name(&self) -> &str {
            self.name
        }

        fn version(&self) -> SchemaVersion {
            SchemaVersion::new(5, 0)
        }

        fn create_type(&mut self, _: &Collection) -> Result<(), AdapterError> {
            self.record("create_type")
        }

        fn keep_data(&mut self, _: &Collection, _: u8) -> Result<bool, AdapterError> {
            self.record("keep_data").map(|_| self.writes)
        }

        fn get_data(&mut self, _: &mut Collection) -> Result<DecodeReport, AdapterError> {
            self.record("get_data").map(|_| DecodeReport::default())
        }

        fn get_collection(
            &mut self,
            _: &[u8],
            _: &ParameterValue,
            _: &ParameterValue,
        ) -> Result<Collection, AdapterError> {
            self.record("get_collection").map(|_| Collection::new())
        }

        fn create_template(&mut self, _: &str, _: &Template) -> Result<(), AdapterError> {
            self.record("create_template")
        }

        fn get_template(&mut self, _: &str) -> Result<Template, AdapterError> {
            self.record("get_template").map(|_| Template::default())
        }

        fn template_names(&mut self) -> Result<Vec<String>, AdapterError> {
            self.record("template_names").map(|_| vec![self.name.to_string()])
        }

        fn collection_identifiers(&mut self) -> Result<Vec<CollectionId>, AdapterError> {
            self.record("collection_identifiers").map(|_| Vec::new())
        }
    }

    fn config(names: &[&str]) -> PoolConfig {
        let route: Vec<String> = names.iter().map(|name| name.to_string()).collect();
        PoolConfig {
            create_type: route.clone(),
            keep_data: route.clone(),
            get_data: route.clone(),
            get_collection: route.clone(),
            create_template: route.clone(),
            get_template: route,
        }
    }

    #[test]
    fn test_reads_fall_through_to_the_next_adapter() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut pool = AdapterPool::new(
            vec![Stub::boxed("broken", true, &calls), Stub::boxed("xml50", false, &calls)],
            &config(&["broken", "xml50"]),
        );

        assert!(pool.get_template("base").is_ok());
        assert_eq!(pool.template_names().unwrap(), vec!["xml50"]);
        assert_eq!(
            *calls.borrow(),
            vec![
                "broken:get_template",
                "xml50:get_template",
                "broken:template_names",
                "xml50:template_names"
            ]
        );
    }

    #[test]
    fn test_writes_need_every_adapter() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut pool = AdapterPool::new(
            vec![Stub::boxed("xml50", false, &calls), Stub::boxed("broken", true, &calls)],
            &config(&["xml50", "broken"]),
        );

        assert!(pool.create_type(&Collection::new()).is_err());
        // One adapter wrote, so keeping data succeeds.
        assert!(pool.keep_data(&Collection::new(), 3).unwrap());
        assert_eq!(calls.borrow().len(), 4);
    }

    #[test]
    fn test_unknown_names_leave_operations_unrouted() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut pool =
            AdapterPool::new(vec![Stub::boxed("xml50", false, &calls)], &config(&["sql"]));
        let empty = ParameterValue::new([0; 7], Vec::new());
        assert!(matches!(
            pool.get_collection(b"KPZ", &empty, &empty),
            Err(AdapterError::NoAdapter("get_collection"))
        ));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_all_failing_reads_return_the_last_error() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut pool = AdapterPool::new(
            vec![Stub::boxed("a", true, &calls), Stub::boxed("b", true, &calls)],
            &config(&["a", "b"]),
        );
        match pool.get_data(&mut Collection::new()) {
            Err(AdapterError::TemplateNotFound(name)) => assert_eq!(name, "b"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
