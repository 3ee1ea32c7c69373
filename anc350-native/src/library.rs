use libloading::{Library, Symbol};

use crate::{DriverVersion, NativeError, NativeOption};

/// A loaded vendor library.
#[derive(Debug)]
pub(crate) struct NativeLibrary {
    dll: Library,
    version: DriverVersion,
}

impl NativeLibrary {
    pub(crate) fn load(option: &NativeOption) -> Result<Self, NativeError> {
        let path = option.library_path();
        tracing::debug!("Loading {}", path.to_string_lossy());
        let dll = unsafe { Library::new(&path) }
            .map_err(|_| NativeError::LibraryNotFound(path.to_string_lossy().into_owned()))?;
        Ok(Self {
            dll,
            version: option.version,
        })
    }

    pub(crate) unsafe fn symbol<T>(&self, name: &'static str) -> Result<Symbol<'_, T>, NativeError> {
        unsafe { self.dll.get::<T>(name.as_bytes()) }
            .map_err(|_| NativeError::FunctionNotFound(name.to_owned()))
    }

    pub(crate) fn check(&self, name: &str, code: i32) -> Result<(), NativeError> {
        NativeError::from_code(self.version, code).inspect_err(|e| {
            tracing::error!("{} returned {}: {}", name, code, e);
        })
    }
}

// Looks up `$name` and calls it with the stdcall convention, translating the return code.
macro_rules! call {
    ($lib:expr, $name:literal, fn($($ty:ty),* $(,)?), $($arg:expr),* $(,)?) => {{
        let code = unsafe {
            $lib.symbol::<unsafe extern "system" fn($($ty),*) -> i32>($name)?($($arg),*)
        };
        $lib.check($name, code)
    }};
}

pub(crate) use call;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_not_found() {
        let option = NativeOption {
            library_path: Some("/nonexistent/libanc350v4.so".into()),
            ..Default::default()
        };
        assert_eq!(
            Err(NativeError::LibraryNotFound(
                "/nonexistent/libanc350v4.so".to_string()
            )),
            NativeLibrary::load(&option).map(|_| ())
        );
    }
}
