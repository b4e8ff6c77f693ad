pub mod mandate_gateway;
