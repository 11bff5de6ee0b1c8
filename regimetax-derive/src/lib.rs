use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, LitStr, Meta, Type};

/// Derive macro describing the CSV columns of an input record.
///
/// For each named field it records:
/// - the column name (honours `#[serde(rename = "...")]`)
/// - whether the column must be filled in: `Option<T>` fields and fields
///   marked `#[serde(default)]` may be left blank
/// - a description taken from the field's doc comment
///
/// Generates `csv_columns() -> &'static [CsvColumn]` and
/// `csv_header() -> &'static str`. A `CsvColumn` type with `name`, `required` and
/// `description` fields must be in scope at the derive site.
#[proc_macro_derive(CsvColumns, attributes(serde))]
pub fn derive_csv_columns(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(name, "CsvColumns needs named fields")
                    .to_compile_error()
                    .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "CsvColumns only supports structs")
                .to_compile_error()
                .into()
        }
    };

    let mut columns = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = match SerdeAttrs::parse(&field.attrs) {
            Ok(attrs) => attrs,
            Err(err) => return err.to_compile_error().into(),
        };
        if attrs.skip {
            continue;
        }
        let column = attrs.rename.unwrap_or_else(|| ident.to_string());
        let required = !(attrs.default || is_option_type(&field.ty));
        let doc = doc_comment(&field.attrs);
        columns.push((column, required, doc));
    }

    let header = columns
        .iter()
        .map(|(column, _, _)| column.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let entries = columns.iter().map(|(column, required, description)| {
        quote! {
            CsvColumn {
                name: #column,
                required: #required,
                description: #description,
            }
        }
    });

    let expanded = quote! {
        impl #name {
            pub fn csv_columns() -> &'static [CsvColumn] {
                static COLUMNS: &[CsvColumn] = &[
                    #(#entries),*
                ];
                COLUMNS
            }

            pub fn csv_header() -> &'static str {
                #header
            }
        }
    };

    TokenStream::from(expanded)
}

#[derive(Default)]
struct SerdeAttrs {
    rename: Option<String>,
    default: bool,
    skip: bool,
}

impl SerdeAttrs {
    fn parse(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut parsed = SerdeAttrs::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    parsed.rename = Some(value.value());
                } else if meta.path.is_ident("default") {
                    parsed.default = true;
                    if meta.input.peek(syn::Token![=]) {
                        let _: LitStr = meta.value()?.parse()?;
                    }
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_deserializing")
                {
                    parsed.skip = true;
                } else if meta.input.peek(syn::Token![=]) {
                    let _: syn::Expr = meta.value()?.parse()?;
                } else if meta.input.peek(syn::token::Paren) {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    let _: proc_macro2::TokenStream = content.parse()?;
                }
                Ok(())
            })?;
        }
        Ok(parsed)
    }
}

fn doc_comment(attrs: &[syn::Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(meta) => match &meta.value {
                syn::Expr::Lit(expr_lit) => match &expr_lit.lit {
                    Lit::Str(lit_str) => Some(lit_str.value().trim().to_string()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}
