//! Restricted grammar for definition files.
//!
//! A definition file may only contain `use` declarations and top-level named
//! `const`/`static` items. Anything else (functions, impls, types, macros,
//! modules) would smuggle arbitrary logic into target declarations and is
//! rejected before the file ever reaches the staging tree.

use std::path::Path;

use syn::Item;

use crate::stage::StageError;

/// Parse a definition file and return its declared target names, in
/// declaration order.
///
/// Anonymous declarations (`const _`) are rejected: every target must have a
/// name that can be addressed as a label.
pub fn parse_definition_file(path: &Path, source: &str) -> Result<Vec<String>, StageError> {
  let file = syn::parse_file(source).map_err(|e| StageError::Parse {
    path: path.display().to_string(),
    message: e.to_string(),
  })?;

  let mut targets = Vec::new();

  for item in &file.items {
    match item {
      Item::Use(_) => {}
      Item::Const(item) => {
        if item.ident == "_" {
          return Err(StageError::AnonymousTarget {
            path: path.display().to_string(),
          });
        }
        targets.push(item.ident.to_string());
      }
      Item::Static(item) => {
        targets.push(item.ident.to_string());
      }
      _ => {
        return Err(StageError::InvalidDeclaration {
          path: path.display().to_string(),
        });
      }
    }
  }

  Ok(targets)
}
