//! Populate the DECRYPT ontology from harvested DECODE records.
//!
//! Each record becomes one subject in the configured namespace, typed as
//! `Record`, with one literal triple per mapped field that is present and
//! non-null.
use std::fs;
use std::fs::File;
use std::io::BufReader;

use chrono::NaiveDateTime;
use log::warn;
use serde_json::Value;
use sophia::api::graph::{Graph, MutableGraph};
use sophia::api::ns::{rdf, xsd, Namespace, NsTerm};
use sophia::api::prefix::Prefix;
use sophia::api::serializer::{Stringifier, TripleSerializer};
use sophia::api::source::TripleSource;
use sophia::api::term::Term;
use sophia::inmem::graph::FastGraph;
use sophia::iri::{InvalidIri, Iri};
use sophia::turtle::parser::turtle;
use sophia::turtle::serializer::turtle::{TurtleConfig, TurtleSerializer};
use thiserror::Error;

use crate::record::Detail;

/// Format of `creation_date` values in the DECODE API.
const DECODE_DATETIME: &str = "%Y-%m-%d %H:%M:%S";
/// ISO 8601 form used for `xsd:dateTime` literals.
const ISO_DATETIME: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Error)]
pub enum OntoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse ontology: {0}")]
    Parse(String),
    #[error(transparent)]
    Iri(#[from] InvalidIri),
    #[error("record {id}: field '{field}' is not an integer: {value}")]
    Integer { id: String, field: &'static str, value: String },
    #[error("cannot extend graph: {0}")]
    Graph(String),
    #[error("cannot serialize graph: {0}")]
    Serialize(String),
}

/// Literal datatype of a mapped property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datatype {
    String,
    Integer,
    Boolean,
    DateTime,
}

impl Datatype {
    fn xsd(self) -> NsTerm<'static> {
        match self {
            Datatype::String => xsd::string,
            Datatype::Integer => xsd::integer,
            Datatype::Boolean => xsd::boolean,
            Datatype::DateTime => xsd::dateTime,
        }
    }
}

/// How one DECODE field maps onto the ontology.
pub struct PropertyMapping {
    pub field: &'static str,
    pub term: &'static str,
    pub datatype: Datatype,
}

/// Field-to-predicate table of the DECRYPT ontology, applied field by field
/// and independently per record.
pub static PROPERTY_MAPPINGS: [PropertyMapping; 16] = [
    PropertyMapping { field: "id", term: "hasID", datatype: Datatype::String },
    PropertyMapping { field: "name", term: "hasName", datatype: Datatype::String },
    PropertyMapping { field: "current_country", term: "hasCurrentCountry", datatype: Datatype::String },
    PropertyMapping { field: "current_city", term: "hasCurrentCity", datatype: Datatype::String },
    PropertyMapping { field: "current_holder", term: "hasCurrentHolder", datatype: Datatype::String },
    PropertyMapping { field: "additional_information", term: "hasAdditionalInformation", datatype: Datatype::String },
    PropertyMapping { field: "number_of_pages", term: "hasNumberOfPages", datatype: Datatype::Integer },
    PropertyMapping { field: "cleartext_lang", term: "hasCleartextLanguage", datatype: Datatype::String },
    PropertyMapping { field: "author", term: "hasAuthor", datatype: Datatype::String },
    PropertyMapping { field: "creation_date", term: "hasCreationDate", datatype: Datatype::DateTime },
    PropertyMapping { field: "private_ciphertext", term: "hasPrivateCiphertext", datatype: Datatype::Boolean },
    PropertyMapping { field: "cipher_types", term: "hasCipherTypes", datatype: Datatype::String },
    PropertyMapping { field: "symbol_sets", term: "hasSymbolSets", datatype: Datatype::String },
    PropertyMapping { field: "status", term: "hasStatus", datatype: Datatype::String },
    PropertyMapping { field: "record_type", term: "hasRecordType", datatype: Datatype::String },
    PropertyMapping { field: "start_year", term: "hasStartYear", datatype: Datatype::Integer },
];

/// Load the ontology schema from the RDF Turtle file at `path`.
pub fn load_schema(path: &str) -> Result<FastGraph, OntoError> {
    let reader = BufReader::new(File::open(path)?);
    let graph: FastGraph = turtle::parse_bufread(reader).collect_triples().map_err(|e| OntoError::Parse(e.to_string()))?;
    if log::log_enabled!(log::Level::Debug) {
        log::debug!("~ {} triples loaded from {path}", graph.triples().size_hint().0);
    }
    Ok(graph)
}

/// Assert triples for each record, extending the graph in place. Returns the
/// number of triples asserted. Records without a usable string id are skipped
/// with a warning; an unparseable datetime skips that field only; a
/// non-numeric value in an integer field aborts the step.
pub fn populate(graph: &mut FastGraph, namespace: &str, records: &[Detail]) -> Result<usize, OntoError> {
    let ns = Namespace::new(namespace.to_owned())?;
    let mut asserted = 0;
    for record in records {
        let Some(id) = record.id() else {
            warn!("skipping a record without a string id");
            continue;
        };
        let subject = match ns.get(id) {
            Ok(iri) => iri,
            Err(e) => {
                warn!("skipping record {id}: {e}");
                continue;
            }
        };
        insert(graph, &subject, &rdf::type_, &ns.get("Record")?)?;
        asserted += 1;
        for mapping in &PROPERTY_MAPPINGS {
            let Some(value) = record.field(mapping.field) else { continue };
            let Some(lexical) = convert(mapping, value, id)? else { continue };
            insert(graph, &subject, &ns.get(mapping.term)?, &(lexical.as_str() * mapping.datatype.xsd()))?;
            asserted += 1;
        }
    }
    Ok(asserted)
}

/// Write the graph as pretty RDF Turtle to `path`, with the configured prefix
/// bound next to the usual vocabulary prefixes.
pub fn serialize(graph: &FastGraph, prefix: &str, namespace: &str, path: &str) -> Result<(), OntoError> {
    let config = TurtleConfig::new().with_pretty(true).with_own_prefix_map(prefixes(prefix, namespace));
    let ttl = TurtleSerializer::new_stringifier_with_config(config).serialize_graph(graph).map_err(|e| OntoError::Serialize(e.to_string()))?.to_string();
    fs::write(path, ttl)?;
    Ok(())
}

/// (prefix, iri) pairs for the serializer.
fn prefixes(prefix: &str, namespace: &str) -> Vec<(Prefix<Box<str>>, Iri<Box<str>>)> {
    vec![
        (Prefix::new_unchecked(prefix.to_owned().into_boxed_str()), Iri::new_unchecked(namespace.to_owned().into_boxed_str())),
        (Prefix::new_unchecked("rdf".into()), Iri::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#".into())),
        (Prefix::new_unchecked("rdfs".into()), Iri::new_unchecked("http://www.w3.org/2000/01/rdf-schema#".into())),
        (Prefix::new_unchecked("xsd".into()), Iri::new_unchecked("http://www.w3.org/2001/XMLSchema#".into())),
    ]
}

fn insert<S: Term, P: Term, O: Term>(graph: &mut FastGraph, s: S, p: P, o: O) -> Result<(), OntoError> {
    graph.insert(s, p, o).map_err(|e| OntoError::Graph(e.to_string()))?;
    Ok(())
}

/// Convert a field value into the lexical form of its typed literal.
/// `Ok(None)` means the field is skipped, with a warning already logged.
fn convert(mapping: &PropertyMapping, value: &Value, id: &str) -> Result<Option<String>, OntoError> {
    let lexical = match mapping.datatype {
        Datatype::String => match scalar_lexical(value) {
            Some(lexical) => lexical,
            None => {
                warn!("record {id}: field '{}' holds a non-scalar value, skipping this field", mapping.field);
                return Ok(None);
            }
        },
        Datatype::Integer => integer_lexical(value).ok_or_else(|| OntoError::Integer { id: id.to_owned(), field: mapping.field, value: value.to_string() })?,
        Datatype::Boolean => match value {
            Value::Bool(b) => b.to_string(),
            _ => scalar_lexical(value).is_some_and(|lexical| lexical.eq_ignore_ascii_case("true")).to_string(),
        },
        Datatype::DateTime => match value.as_str().and_then(|raw| NaiveDateTime::parse_from_str(raw, DECODE_DATETIME).ok()) {
            Some(datetime) => datetime.format(ISO_DATETIME).to_string(),
            None => {
                warn!("unable to parse datetime {value} for record {id}, skipping this field");
                return Ok(None);
            }
        },
    };
    Ok(Some(lexical))
}

fn scalar_lexical(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn integer_lexical(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_i64().map(|n| n.to_string()),
        Value::String(s) => s.trim().parse::<i64>().ok().map(|n| n.to_string()),
        _ => None,
    }
}
