pub mod http_attribute_client;
