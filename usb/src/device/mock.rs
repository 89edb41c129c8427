// Scripted implementation of the OS contract for unit tests. Entries carry
// their own negotiation outcomes, and shared counters record every release,
// open, close and transfer so tests can assert on resource discipline.
use crate::device::base::{
    ControlParams, DeviceAccess, EnumerationCursor, InterfaceAccess, UsbBackend,
};
use crate::error::ResourceError;
use crate::handle::Resource;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Clone, Default)]
pub(crate) struct Counters {
    pub cursor_releases: Rc<Cell<u32>>,
    pub plugin_releases: Rc<Cell<u32>>,
    pub device_releases: Rc<Cell<u32>>,
    pub interface_releases: Rc<Cell<u32>>,
    pub opens: Rc<Cell<u32>>,
    pub closes: Rc<Cell<u32>>,
    pub transfers: Rc<RefCell<Vec<(ControlParams, Vec<u8>)>>>,
}

/// One scripted enumeration element and its negotiation outcome.
pub(crate) struct MockEntry<T> {
    plugin_error: Option<rusb::Error>,
    query_error: Option<rusb::Error>,
    item: RefCell<Option<T>>,
}

pub(crate) fn entry<T>(item: T) -> MockEntry<T> {
    MockEntry {
        plugin_error: None,
        query_error: None,
        item: RefCell::new(Some(item)),
    }
}

/// An element whose plugin creation fails with the given OS code.
pub(crate) fn failing_entry<T>(error: rusb::Error) -> MockEntry<T> {
    MockEntry {
        plugin_error: Some(error),
        query_error: None,
        item: RefCell::new(None),
    }
}

pub(crate) struct MockPlugin<T> {
    item: Option<T>,
    query_error: Option<rusb::Error>,
    releases: Rc<Cell<u32>>,
}

impl<T> Resource for MockPlugin<T> {
    const KIND: &'static str = "mock plugin";

    fn release(&mut self) -> Result<(), ResourceError> {
        self.releases.set(self.releases.get() + 1);
        Ok(())
    }
}

pub(crate) struct MockCursor<T> {
    entries: VecDeque<MockEntry<T>>,
    counters: Counters,
}

impl<T> MockCursor<T> {
    pub fn new(entries: Vec<MockEntry<T>>, counters: &Counters) -> Self {
        Self {
            entries: entries.into(),
            counters: counters.clone(),
        }
    }
}

impl<T> Resource for MockCursor<T> {
    const KIND: &'static str = "mock cursor";

    fn release(&mut self) -> Result<(), ResourceError> {
        let releases = &self.counters.cursor_releases;
        releases.set(releases.get() + 1);
        Ok(())
    }
}

impl<T: Resource> EnumerationCursor for MockCursor<T> {
    type Element = MockEntry<T>;
    type Plugin = MockPlugin<T>;
    type Interface = T;

    fn next_element(&mut self) -> Result<Option<MockEntry<T>>, ResourceError> {
        Ok(self.entries.pop_front())
    }

    fn create_plugin(&mut self, element: &MockEntry<T>) -> Result<MockPlugin<T>, ResourceError> {
        if let Some(error) = element.plugin_error {
            return Err(ResourceError::new("creating plugin", error));
        }
        Ok(MockPlugin {
            item: element.item.borrow_mut().take(),
            query_error: element.query_error,
            releases: self.counters.plugin_releases.clone(),
        })
    }

    fn query_interface(&mut self, plugin: &mut MockPlugin<T>) -> Result<T, ResourceError> {
        if let Some(error) = plugin.query_error.take() {
            return Err(ResourceError::new("querying interface", error));
        }
        plugin
            .item
            .take()
            .ok_or_else(|| ResourceError::new("querying interface", rusb::Error::NotFound))
    }
}

pub(crate) struct MockInterface {
    pub id: u32,
    pub number: u8,
    descriptors: VecDeque<Vec<u8>>,
    transfer_error: Option<rusb::Error>,
    counters: Counters,
}

impl MockInterface {
    pub fn new(number: u8, records: Vec<Vec<u8>>, counters: &Counters) -> Self {
        Self {
            id: 0,
            number,
            descriptors: records.into(),
            transfer_error: None,
            counters: counters.clone(),
        }
    }

    pub fn with_transfer_error(mut self, error: rusb::Error) -> Self {
        self.transfer_error = Some(error);
        self
    }
}

/// A bare interface element for sequence tests, identified by `id`.
pub(crate) fn interface(id: u32, counters: &Counters) -> MockEntry<MockInterface> {
    let mut mock = MockInterface::new(0, vec![], counters);
    mock.id = id;
    entry(mock)
}

impl Resource for MockInterface {
    const KIND: &'static str = "mock interface";

    fn release(&mut self) -> Result<(), ResourceError> {
        let releases = &self.counters.interface_releases;
        releases.set(releases.get() + 1);
        Ok(())
    }
}

impl InterfaceAccess for MockInterface {
    fn interface_number(&mut self) -> Result<u8, ResourceError> {
        Ok(self.number)
    }

    fn next_descriptor(&mut self) -> Result<Option<Vec<u8>>, ResourceError> {
        Ok(self.descriptors.pop_front())
    }

    fn open(&mut self) -> Result<(), ResourceError> {
        self.counters.opens.set(self.counters.opens.get() + 1);
        Ok(())
    }

    fn close(&mut self) -> Result<(), ResourceError> {
        self.counters.closes.set(self.counters.closes.get() + 1);
        Ok(())
    }

    fn control_request(&mut self, params: ControlParams, data: &[u8]) -> Result<(), ResourceError> {
        if let Some(error) = self.transfer_error {
            return Err(ResourceError::new("control request", error));
        }
        self.counters
            .transfers
            .borrow_mut()
            .push((params, data.to_vec()));
        Ok(())
    }
}

pub(crate) struct MockDevice {
    vendor: u16,
    product: u16,
    interfaces: Vec<MockEntry<MockInterface>>,
    counters: Counters,
}

/// A device element advertising the given identity and interfaces.
pub(crate) fn device(
    vendor: u16,
    product: u16,
    interfaces: Vec<MockEntry<MockInterface>>,
    counters: &Counters,
) -> MockEntry<MockDevice> {
    entry(MockDevice {
        vendor,
        product,
        interfaces,
        counters: counters.clone(),
    })
}

impl Resource for MockDevice {
    const KIND: &'static str = "mock device";

    fn release(&mut self) -> Result<(), ResourceError> {
        let releases = &self.counters.device_releases;
        releases.set(releases.get() + 1);
        Ok(())
    }
}

impl DeviceAccess for MockDevice {
    type Interfaces = MockCursor<MockInterface>;
    type VideoInterface = MockInterface;

    fn vendor_id(&mut self) -> Result<u16, ResourceError> {
        Ok(self.vendor)
    }

    fn product_id(&mut self) -> Result<u16, ResourceError> {
        Ok(self.product)
    }

    fn video_control_interfaces(&mut self) -> Result<MockCursor<MockInterface>, ResourceError> {
        Ok(MockCursor::new(
            std::mem::take(&mut self.interfaces),
            &self.counters,
        ))
    }
}

pub(crate) struct MockBackend {
    devices: Option<MockCursor<MockDevice>>,
}

impl MockBackend {
    pub fn new(devices: Vec<MockEntry<MockDevice>>, counters: &Counters) -> Self {
        Self {
            devices: Some(MockCursor::new(devices, counters)),
        }
    }
}

impl UsbBackend for MockBackend {
    type Devices = MockCursor<MockDevice>;
    type Device = MockDevice;
    type VideoInterface = MockInterface;

    fn usb_devices(&mut self) -> Result<MockCursor<MockDevice>, ResourceError> {
        self.devices
            .take()
            .ok_or_else(|| ResourceError::new("listing USB devices", rusb::Error::NotFound))
    }
}
