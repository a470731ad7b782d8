use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use crate::{
    jit::{GsharedVars, LineNumberEntry, MethodId, MethodJitInfo, ModuleId, TypeHandle, VarInfo},
    symbols::{
        CodeBlock, LocalVariable, LocalsInfo, MethodInfo, ModuleInfo, ModuleRc, SourceLocation,
        SymbolFile, SymbolMethod, SymbolReader,
    },
};

pub struct FakeModule {
    id: ModuleId,
    name: String,
    dynamic: bool,
}

impl FakeModule {
    pub fn new(id: u64, name: &str) -> ModuleRc {
        Arc::new(FakeModule {
            id: ModuleId(id),
            name: name.to_string(),
            dynamic: false,
        })
    }

    pub fn dynamic(id: u64, name: &str) -> ModuleRc {
        Arc::new(FakeModule {
            id: ModuleId(id),
            name: name.to_string(),
            dynamic: true,
        })
    }
}

impl ModuleInfo for FakeModule {
    fn id(&self) -> ModuleId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_dynamic(&self) -> bool {
        self.dynamic
    }
}

pub struct FakeMethod {
    id: MethodId,
    module: ModuleId,
    name: String,
    dynamic: bool,
}

impl FakeMethod {
    pub fn new(id: u64, module: u64, name: &str) -> Arc<FakeMethod> {
        Arc::new(FakeMethod {
            id: MethodId(id),
            module: ModuleId(module),
            name: name.to_string(),
            dynamic: false,
        })
    }

    pub fn dynamic(id: u64, module: u64, name: &str) -> Arc<FakeMethod> {
        Arc::new(FakeMethod {
            id: MethodId(id),
            module: ModuleId(module),
            name: name.to_string(),
            dynamic: true,
        })
    }
}

impl MethodInfo for FakeMethod {
    fn id(&self) -> MethodId {
        self.id
    }

    fn module(&self) -> ModuleId {
        self.module
    }

    fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    fn full_name(&self) -> String {
        self.name.clone()
    }
}

/// Symbol source knowing every method of its own module.
///
/// Line of an IL offset is `10 + il_offset`; a blob starting with `0` opens unloaded.
pub struct FakeSymbolFile {
    module: ModuleId,
    source_file: String,
    loaded: bool,
}

impl SymbolFile for FakeSymbolFile {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn lookup_method(&self, module: &ModuleRc, method: &dyn MethodInfo) -> Option<SymbolMethod> {
        if method.module() != module.id() || module.id() != self.module {
            return None;
        }

        Some(SymbolMethod {
            module: self.module,
            method: method.id(),
            index: (method.id().value() & 0xFFFF) as u32,
        })
    }

    fn lookup_location(&self, _method: &SymbolMethod, il_offset: u32) -> Option<SourceLocation> {
        Some(SourceLocation {
            source_file: self.source_file.clone(),
            row: 10 + il_offset,
            column: 1,
            il_offset,
        })
    }

    fn lookup_locals(&self, _method: &SymbolMethod) -> Option<LocalsInfo> {
        Some(LocalsInfo {
            locals: vec![
                LocalVariable {
                    name: "count".to_string(),
                    index: 0,
                    block: Some(0),
                },
                LocalVariable {
                    name: "item".to_string(),
                    index: 1,
                    block: Some(1),
                },
            ],
            code_blocks: vec![
                CodeBlock {
                    parent: None,
                    start_offset: 0,
                    end_offset: 40,
                },
                CodeBlock {
                    parent: Some(0),
                    start_offset: 8,
                    end_offset: 30,
                },
            ],
        })
    }
}

/// Opens a [`FakeSymbolFile`] whenever symbol bytes are supplied.
#[derive(Default)]
pub struct FakeReader {
    opened: AtomicUsize,
    last_raw: Mutex<Option<Vec<u8>>>,
    last_in_memory: Mutex<Option<bool>>,
}

impl FakeReader {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn last_raw(&self) -> Option<Vec<u8>> {
        self.last_raw.lock().unwrap().clone()
    }

    pub fn last_in_memory(&self) -> Option<bool> {
        *self.last_in_memory.lock().unwrap()
    }
}

impl SymbolReader for FakeReader {
    fn open(
        &self,
        module: &ModuleRc,
        raw: Option<&[u8]>,
        in_memory: bool,
    ) -> Option<Box<dyn SymbolFile>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        *self.last_raw.lock().unwrap() = raw.map(<[u8]>::to_vec);
        *self.last_in_memory.lock().unwrap() = Some(in_memory);

        let raw = raw?;
        Some(Box::new(FakeSymbolFile {
            module: module.id(),
            source_file: format!("/src/{}.cs", module.name()),
            loaded: raw.first() != Some(&0),
        }))
    }
}

pub fn var(index: u32, offset: i32) -> VarInfo {
    VarInfo {
        index,
        offset,
        size: 4,
        begin_scope: 0,
        end_scope: 64,
        type_handle: TypeHandle(0x1000 + index as usize),
    }
}

/// Line table native [0, 10, 20, 30] against IL [0, 5, 12, 18].
pub fn sample_jit_info() -> MethodJitInfo {
    MethodJitInfo {
        code_start: 0x7000_0000,
        code_size: 48,
        prologue_end: 4,
        epilogue_begin: 40,
        line_numbers: vec![
            LineNumberEntry::new(0, 0),
            LineNumberEntry::new(5, 10),
            LineNumberEntry::new(12, 20),
            LineNumberEntry::new(18, 30),
        ],
        this_var: Some(var(0, 16)),
        params: vec![var(1, 24)],
        locals: vec![var(2, -8), var(3, -16)],
        gsharedvt: Some(GsharedVars {
            info_var: var(4, -24),
            locals_var: var(5, -32),
        }),
    }
}
