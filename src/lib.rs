#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use pl_element as element;
pub use pl_rtti as rtti;
pub use pl_utils as utils;
