// ABOUTME: Clients for third-party services outside the LLM providers
// ABOUTME: Currently hosts the recipe photo image search client
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # External Service Clients

pub mod image_search;

pub use image_search::ImageSearchClient;
