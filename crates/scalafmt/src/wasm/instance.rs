use anyhow::Result;
use stepfmt_core::StepError;
use wasmer::Engine;
use wasmer::Instance;
use wasmer::Memory;
use wasmer::MemoryView;
use wasmer::Store;
use wasmer::TypedFunction;
use wasmer::WasmTypeList;

/// Functions every formatter module exports to exchange strings with the host.
struct SharedBytesFunctions {
  get_wasm_memory_buffer: TypedFunction<(), i32>,
  clear_shared_bytes: TypedFunction<i32, ()>,
  add_to_shared_bytes_from_buffer: TypedFunction<i32, ()>,
  set_buffer_with_shared_bytes: TypedFunction<(i32, i32), ()>,
}

/// One linked copy of the module set with its own store.
///
/// Not shared between threads at the same time.
pub struct LinkedInstance {
  store: Store,
  formatter: Instance,
  memory: Memory,
  functions: SharedBytesFunctions,
  buffer_size: usize,
  // the formatter calls into these so they must live as long as it does
  _dependencies: Vec<Instance>,
  _engine: Engine,
}

impl LinkedInstance {
  pub fn new(store: Store, formatter: Instance, dependencies: Vec<Instance>, engine: Engine) -> Result<Self> {
    let memory = match formatter.exports.get_memory("memory") {
      Ok(memory) => memory.clone(),
      Err(err) => return Err(StepError::Linkage(format!("Could not find memory 'memory' in the formatter module: {:#}.", err)).into()),
    };
    let functions = SharedBytesFunctions {
      get_wasm_memory_buffer: typed_export(&store, &formatter, "get_wasm_memory_buffer")?,
      clear_shared_bytes: typed_export(&store, &formatter, "clear_shared_bytes")?,
      add_to_shared_bytes_from_buffer: typed_export(&store, &formatter, "add_to_shared_bytes_from_buffer")?,
      set_buffer_with_shared_bytes: typed_export(&store, &formatter, "set_buffer_with_shared_bytes")?,
    };
    let get_wasm_memory_buffer_size: TypedFunction<(), i32> = typed_export(&store, &formatter, "get_wasm_memory_buffer_size")?;
    let mut instance = LinkedInstance {
      store,
      formatter,
      memory,
      functions,
      buffer_size: 0,
      _dependencies: dependencies,
      _engine: engine,
    };
    let buffer_size = get_wasm_memory_buffer_size.call(&mut instance.store)?;
    if buffer_size <= 0 {
      return Err(StepError::Linkage(format!("The formatter module reported an invalid memory buffer size: {}.", buffer_size)).into());
    }
    instance.buffer_size = buffer_size as usize;
    Ok(instance)
  }

  /// Looks up a function exported by the formatter module.
  ///
  /// A missing or mistyped export is a linkage error.
  pub fn export<Args, Rets>(&self, name: &str) -> Result<TypedFunction<Args, Rets>>
  where
    Args: WasmTypeList,
    Rets: WasmTypeList,
  {
    typed_export(&self.store, &self.formatter, name)
  }

  pub fn store_mut(&mut self) -> &mut Store {
    &mut self.store
  }

  /* SHARED BYTES */

  pub fn send_string(&mut self, text: &str) -> Result<()> {
    self.send_bytes(text.as_bytes())
  }

  fn send_bytes(&mut self, bytes: &[u8]) -> Result<()> {
    let mut index = 0;
    let len = bytes.len();
    self.functions.clear_shared_bytes.call(&mut self.store, wasm_len(len)?)?;
    while index < len {
      let write_count = std::cmp::min(len - index, self.buffer_size);
      self.write_bytes_to_memory_buffer(&bytes[index..(index + write_count)])?;
      self
        .functions
        .add_to_shared_bytes_from_buffer
        .call(&mut self.store, wasm_len(write_count)?)?;
      index += write_count;
    }
    Ok(())
  }

  fn write_bytes_to_memory_buffer(&mut self, bytes: &[u8]) -> Result<()> {
    let offset = self.memory_buffer_offset()?;
    self.memory_view().write(offset, bytes)?;
    Ok(())
  }

  pub fn receive_string(&mut self, len: usize) -> Result<String> {
    let bytes = self.receive_bytes(len)?;
    Ok(String::from_utf8(bytes)?)
  }

  fn receive_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
    let mut index = 0;
    let mut bytes: Vec<u8> = vec![0; len];
    while index < len {
      let read_count = std::cmp::min(len - index, self.buffer_size);
      self
        .functions
        .set_buffer_with_shared_bytes
        .call(&mut self.store, wasm_len(index)?, wasm_len(read_count)?)?;
      self.read_bytes_from_memory_buffer(&mut bytes[index..(index + read_count)])?;
      index += read_count;
    }
    Ok(bytes)
  }

  fn read_bytes_from_memory_buffer(&mut self, bytes: &mut [u8]) -> Result<()> {
    let offset = self.memory_buffer_offset()?;
    self.memory_view().read(offset, bytes)?;
    Ok(())
  }

  fn memory_buffer_offset(&mut self) -> Result<u64> {
    let pointer = self.functions.get_wasm_memory_buffer.call(&mut self.store)?;
    Ok(pointer as u32 as u64)
  }

  fn memory_view(&self) -> MemoryView {
    self.memory.view(&self.store)
  }
}

/// Converts a byte count to the module's 32-bit length type.
fn wasm_len(len: usize) -> Result<i32> {
  match i32::try_from(len) {
    Ok(len) => Ok(len),
    Err(_) => Err(StepError::Format(format!("The text is too large to send to the formatter ({} bytes).", len)).into()),
  }
}

fn typed_export<Args, Rets>(store: &Store, instance: &Instance, name: &str) -> Result<TypedFunction<Args, Rets>>
where
  Args: WasmTypeList,
  Rets: WasmTypeList,
{
  match instance.exports.get_function(name) {
    Ok(func) => match func.typed::<Args, Rets>(store) {
      Ok(typed_func) => Ok(typed_func),
      Err(err) => Err(StepError::Linkage(format!("Export '{}' has an unexpected signature: {:#}.", name, err)).into()),
    },
    Err(_) => Err(StepError::Linkage(format!("Could not find export '{}' in the formatter module.", name)).into()),
  }
}
